// Copyright 2025 the statchart Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The few `f64` functions `core` does not provide, backed by `std` or `libm`.

use kurbo::Point;

#[cfg(all(not(feature = "std"), not(feature = "libm")))]
compile_error!("statchart_render requires either the `std` or `libm` feature");

macro_rules! unary {
    ($($(#[$doc:meta])* $name:ident => $libm:ident;)*) => {
        $(
            $(#[$doc])*
            #[inline]
            pub(crate) fn $name(x: f64) -> f64 {
                #[cfg(feature = "std")]
                {
                    x.$name()
                }
                #[cfg(not(feature = "std"))]
                {
                    libm::$libm(x)
                }
            }
        )*
    };
}

unary! {
    floor => floor;
    ceil => ceil;
    log10 => log10;
    sin => sin;
    cos => cos;
}

/// `10^exp`.
#[inline]
pub(crate) fn pow10(exp: f64) -> f64 {
    #[cfg(feature = "std")]
    {
        10_f64.powf(exp)
    }
    #[cfg(not(feature = "std"))]
    {
        libm::pow(10.0, exp)
    }
}

/// The point at `radius` from `center` in direction `angle_deg` (clockwise, y down).
pub(crate) fn polar(center: Point, radius: f64, angle_deg: f64) -> Point {
    let a = angle_deg.to_radians();
    Point::new(center.x + radius * cos(a), center.y + radius * sin(a))
}
