//! Typed extraction of inner payloads from response enums.
//!
//! The frame reader hands out [`ServoResponse`](crate::packets::ServoResponse)
//! values; callers waiting for one particular reply use [`ExtractInner`] to
//! pick out the payload type they expect without matching every variant.
//!
//! ```
//! use sagittarius::ExtractInner;
//! use sagittarius::packets::ServoResponse;
//! use sagittarius::commands::ReadPositionResponse;
//!
//! # fn example(response: ServoResponse) {
//! let position: Option<&ReadPositionResponse> = response.as_inner();
//! if let Some(position) = position {
//!     println!("servo {} at {} tenths of a degree", position.id, position.tenth_degrees);
//! }
//! # }
//! ```

pub trait ExtractInner<T> {
    /// Reference to the inner value if the variant holds a `T`.
    fn as_inner(&self) -> Option<&T>;

    /// Consumes the enum, returning the inner value if the variant holds a `T`.
    fn into_inner(self) -> Option<T>;
}

/// Implements [`ExtractInner`] for one `enum::Variant(inner)` pairing.
#[macro_export]
macro_rules! impl_extract_inner {
    ($enum:ty, $variant:ident, $inner:ty) => {
        impl $crate::ExtractInner<$inner> for $enum {
            #[inline]
            fn as_inner(&self) -> Option<&$inner> {
                match self {
                    Self::$variant(inner) => Some(inner),
                    #[allow(unreachable_patterns)]
                    _ => None,
                }
            }

            #[inline]
            fn into_inner(self) -> Option<$inner> {
                match self {
                    Self::$variant(inner) => Some(inner),
                    #[allow(unreachable_patterns)]
                    _ => None,
                }
            }
        }
    };
}
