/// This trait represents the operations a histogram must be able to perform on the underlying
/// counter type. Saturating arithmetic keeps a bucket that wraps from corrupting the histogram;
/// partial ordering and the float conversion exist for threshold checks on counts.
pub trait Counter:
    num_traits::Num + num_traits::Saturating + Copy + PartialOrd<Self>
{
    /// Counter as a f64.
    fn as_f64(&self) -> f64;
    /// Counter as a u64.
    fn as_u64(&self) -> u64;
}

impl Counter for u8 {
    #[inline]
    fn as_f64(&self) -> f64 {
        f64::from(*self)
    }
    #[inline]
    fn as_u64(&self) -> u64 {
        u64::from(*self)
    }
}

impl Counter for u16 {
    #[inline]
    fn as_f64(&self) -> f64 {
        f64::from(*self)
    }
    #[inline]
    fn as_u64(&self) -> u64 {
        u64::from(*self)
    }
}

impl Counter for u32 {
    #[inline]
    fn as_f64(&self) -> f64 {
        f64::from(*self)
    }
    #[inline]
    fn as_u64(&self) -> u64 {
        u64::from(*self)
    }
}

impl Counter for u64 {
    #[inline]
    fn as_f64(&self) -> f64 {
        *self as f64
    }
    #[inline]
    fn as_u64(&self) -> u64 {
        *self
    }
}
