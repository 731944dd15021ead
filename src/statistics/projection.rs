use std::cmp::Ordering;
use std::ops::Sub;

use crate::types::{DomainValue, NUMERIC_TYPE_CLASS};

/*
    Projection of an arbitrary domain value onto a comparable scalar so that
    histogram buckets can be laid out over a single axis. A projection is the
    pair (type class, magnitude) compared lexicographically: values of
    different type classes never interleave, numeric values within the class
    are ordered by their magnitude. Non-numeric values project to magnitude 0,
    they only ever participate through their class.

    Subtraction is the one subtle bit: within a class it is the plain
    magnitude difference, across classes it returns a signed infinity. That
    sentinel is how the histogram detects that a range crosses a type class
    boundary, any non-finite width means "does not intersect this bucket
    within the same class".
 */

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projection {
    pub class: i32,
    pub magnitude: f64,
}

impl Projection {
    pub fn numeric(magnitude: f64) -> Projection {
        Projection { class: NUMERIC_TYPE_CLASS, magnitude }
    }

    pub fn from_value(value: &DomainValue) -> Projection {
        Projection {
            class: value.type_class(),
            magnitude: value.as_number().unwrap_or(0.0),
        }
    }

    pub fn min(self, other: Projection) -> Projection {
        if other < self { other } else { self }
    }

    pub fn max(self, other: Projection) -> Projection {
        if other > self { other } else { self }
    }

    // total order for sorting runs and buckets, finite magnitudes assumed
    pub fn cmp_total(&self, other: &Projection) -> Ordering {
        self.class.cmp(&other.class).then(self.magnitude.total_cmp(&other.magnitude))
    }
}

impl Sub for Projection {
    type Output = f64;

    fn sub(self, rhs: Projection) -> f64 {
        if self.class == rhs.class {
            self.magnitude - rhs.magnitude
        } else if self.class > rhs.class {
            f64::INFINITY
        } else {
            f64::NEG_INFINITY
        }
    }
}

impl PartialOrd for Projection {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match self.class.cmp(&other.class) {
            Ordering::Equal => self.magnitude.partial_cmp(&other.magnitude),
            ord => Some(ord),
        }
    }
}
