// cf-core/src/units.rs

use uom::si::f64::{
    Acceleration as UomAcceleration, Angle as UomAngle, Force as UomForce, Mass as UomMass,
    Time as UomTime, Velocity as UomVelocity,
};

// Public canonical unit types (SI, f64)
pub type Accel = UomAcceleration;
pub type Angle = UomAngle;
pub type Force = UomForce;
pub type Mass = UomMass;
pub type Time = UomTime;
pub type Velocity = UomVelocity;

#[inline]
pub fn mps(v: f64) -> Velocity {
    use uom::si::velocity::meter_per_second;
    Velocity::new::<meter_per_second>(v)
}

#[inline]
pub fn newtons(v: f64) -> Force {
    use uom::si::force::newton;
    Force::new::<newton>(v)
}

#[inline]
pub fn kg(v: f64) -> Mass {
    use uom::si::mass::kilogram;
    Mass::new::<kilogram>(v)
}

#[inline]
pub fn s(v: f64) -> Time {
    use uom::si::time::second;
    Time::new::<second>(v)
}

#[inline]
pub fn deg(v: f64) -> Angle {
    use uom::si::angle::degree;
    Angle::new::<degree>(v)
}

/// Speed in miles per hour, for operator-facing output.
#[inline]
pub fn mps_to_mph(v: f64) -> f64 {
    use uom::si::velocity::mile_per_hour;
    mps(v).get::<mile_per_hour>()
}

/// Speed in m/s from miles per hour.
#[inline]
pub fn mph_to_mps(v: f64) -> f64 {
    use uom::si::velocity::{meter_per_second, mile_per_hour};
    Velocity::new::<mile_per_hour>(v).get::<meter_per_second>()
}

/// Sine of an angle given in degrees.
#[inline]
pub fn sin_deg(v: f64) -> f64 {
    use uom::si::angle::radian;
    deg(v).get::<radian>().sin()
}

pub mod constants {
    use super::*;

    pub const G0_MPS2: f64 = 9.806_65;

    #[inline]
    pub fn g0() -> Accel {
        use uom::si::acceleration::meter_per_second_squared;
        Accel::new::<meter_per_second_squared>(G0_MPS2)
    }

    /// Weight of a mass under standard gravity.
    #[inline]
    pub fn weight(mass_kg: f64) -> Force {
        kg(mass_kg) * g0()
    }
}
