use crate::errors::CreationError;
use std::convert::TryFrom;

/// Bucket geometry for an HDR histogram: the mapping from recorded values to slots in a counts
/// array, at a precision of `significant_value_digits` decimal digits.
///
/// Values are covered by a series of buckets that each span twice the range of the previous one.
/// Each bucket holds `sub_bucket_count` sub-buckets, but only the top half of each bucket past the
/// first is ever used (the bottom half overlaps the buckets before it, which cover those values at
/// better precision). Bucket 0 is the exception and uses all of its sub-buckets. This mirrors the
/// layout of the Java and Rust HdrHistogram implementations, so recorded distributions are
/// bucket-compatible with them.
///
/// The geometry is shared by every histogram variant; only the storage of the counts themselves
/// (plain integers, mutex-guarded, or atomics) differs between variants.
#[derive(Debug, Clone)]
pub(crate) struct Layout {
    lowest_discernible_value: u64,
    highest_trackable_value: u64,
    significant_value_digits: u8,

    bucket_count: u32,
    sub_bucket_count: u32,
    sub_bucket_half_count: u32,
    sub_bucket_half_count_magnitude: u32,
    sub_bucket_mask: u64,

    unit_magnitude: u32,
    leading_zero_count_base: u32,

    counts_len: usize,
}

impl Layout {
    /// Establish the geometry needed to track values in `[low, high]` to `sigfig` significant
    /// decimal digits.
    pub(crate) fn new(low: u64, high: u64, sigfig: u8) -> Result<Layout, CreationError> {
        if low < 1 {
            return Err(CreationError::LowIsZero);
        }
        if low > u64::max_value() / 2 {
            return Err(CreationError::LowExceedsMax);
        }
        if high < 2 * low {
            return Err(CreationError::HighLessThanTwiceLow);
        }
        if sigfig > 5 {
            return Err(CreationError::SigFigExceedsMax);
        }

        // Given a 3 decimal digit accuracy, it's "ok to be +/- 2 units at 2000" but NOT at 1999.
        // Single unit resolution must therefore be maintained up to 2 * 10^sigfig, and the
        // sub-bucket count is that value's power-of-two ceiling so plain shifts can index it.
        let largest_single_unit_resolution_value = 2 * 10_u64.pow(u32::from(sigfig));
        let sub_bucket_count_magnitude =
            64 - (largest_single_unit_resolution_value - 1).leading_zeros();
        let sub_bucket_half_count_magnitude = sub_bucket_count_magnitude.max(1) - 1;

        // The lowest discernible value determines how many low-order bits carry no information.
        let unit_magnitude = 63 - low.leading_zeros();
        if unit_magnitude + sub_bucket_count_magnitude > 63 {
            // A sub-bucket index would need bits past the top of a u64.
            return Err(CreationError::CannotRepresentSigFigBeyondLow);
        }

        let sub_bucket_count = 1_u32 << (sub_bucket_half_count_magnitude + 1);
        let sub_bucket_half_count = sub_bucket_count / 2;
        let sub_bucket_mask = (u64::from(sub_bucket_count) - 1) << unit_magnitude;

        // Used by index_for() to derive the bucket index with a single leading-zeros count:
        // subtract the bits used by the largest value in bucket 0.
        let leading_zero_count_base = 64 - unit_magnitude - sub_bucket_half_count_magnitude - 1;

        let bucket_count = buckets_needed_to_cover(high, sub_bucket_count, unit_magnitude);

        // Buckets past the first only contribute their top half (see type docs), plus one extra
        // half for the bottom of bucket 0.
        let counts_len = u64::from(bucket_count + 1) * u64::from(sub_bucket_half_count);
        let counts_len =
            usize::try_from(counts_len).map_err(|_| CreationError::UsizeTypeTooSmall)?;

        Ok(Layout {
            lowest_discernible_value: low,
            highest_trackable_value: high,
            significant_value_digits: sigfig,
            bucket_count,
            sub_bucket_count,
            sub_bucket_half_count,
            sub_bucket_half_count_magnitude,
            sub_bucket_mask,
            unit_magnitude,
            leading_zero_count_base,
            counts_len,
        })
    }

    /// Map a value to its slot in the counts array, or `None` if the value lies beyond the
    /// trackable range.
    #[inline]
    pub(crate) fn index_for(&self, value: u64) -> Option<usize> {
        let index = self.unchecked_index_for(value);
        if index < self.counts_len {
            Some(index)
        } else {
            None
        }
    }

    /// Like `index_for`, but out-of-range values clamp to the last slot. Used for count lookups,
    /// where the Java implementation clamps rather than errors.
    #[inline]
    pub(crate) fn index_for_clamped(&self, value: u64) -> usize {
        self.unchecked_index_for(value).min(self.counts_len - 1)
    }

    #[inline]
    fn unchecked_index_for(&self, value: u64) -> usize {
        // Number of powers of two by which the value exceeds the largest value in bucket 0; the
        // mask maps small values to bucket 0. Each successive bucket holds values 2x greater, so
        // this is the bucket index.
        let bucket_index =
            self.leading_zero_count_base - (value | self.sub_bucket_mask).leading_zeros();

        // For bucket 0 this is just the (unit-scaled) value; for any other bucket it always lands
        // in the top half of the sub-bucket range, because a value in the bottom half would have
        // been claimed by the previous bucket.
        let sub_bucket_index = (value >> (bucket_index + self.unit_magnitude)) as usize;

        // The first slot a bucket actually uses sits halfway through its sub-bucket range.
        let bucket_base_index =
            (bucket_index as usize + 1) << self.sub_bucket_half_count_magnitude;
        bucket_base_index + sub_bucket_index - self.sub_bucket_half_count as usize
    }

    pub(crate) fn counts_len(&self) -> usize {
        self.counts_len
    }

    pub(crate) fn lowest_discernible_value(&self) -> u64 {
        self.lowest_discernible_value
    }

    pub(crate) fn highest_trackable_value(&self) -> u64 {
        self.highest_trackable_value
    }

    pub(crate) fn significant_value_digits(&self) -> u8 {
        self.significant_value_digits
    }

    pub(crate) fn bucket_count(&self) -> u32 {
        self.bucket_count
    }
}

/// The k'th bucket covers `0 * 2^k` to `sub_bucket_count * 2^k` in units of `2^k`; count how many
/// doublings are needed before `value` becomes representable.
fn buckets_needed_to_cover(value: u64, sub_bucket_count: u32, unit_magnitude: u32) -> u32 {
    let mut smallest_untrackable_value = u64::from(sub_bucket_count) << unit_magnitude;
    let mut buckets_needed = 1;
    while smallest_untrackable_value <= value {
        if smallest_untrackable_value > u64::max_value() / 2 {
            // The next doubling would overflow; that bucket covers everything up to u64::MAX.
            return buckets_needed + 1;
        }
        smallest_untrackable_value <<= 1;
        buckets_needed += 1;
    }
    buckets_needed
}
