use crate::prelude::Real;

/// Butcher tableau of an explicit embedded Runge-Kutta pair.
///
/// The solution is advanced with the higher order weights `b` (local
/// extrapolation) and `e = b - b_low` gives the embedded error estimate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tableau {
    pub c: &'static [Real],
    pub a: &'static [&'static [Real]],
    pub b: &'static [Real],
    pub e: &'static [Real],
    /// Order of the embedded (lower order) solution.
    pub error_order: u32,
}

impl Tableau {
    pub fn stages(&self) -> usize {
        self.c.len()
    }
}

/// Dormand-Prince 5(4). The last stage is evaluated at the new solution and
/// only contributes to the error estimate.
pub const DORMAND_PRINCE_45: Tableau = Tableau {
    c: &[0.0, 1.0 / 5.0, 3.0 / 10.0, 4.0 / 5.0, 8.0 / 9.0, 1.0, 1.0],
    a: &[
        &[],
        &[1.0 / 5.0],
        &[3.0 / 40.0, 9.0 / 40.0],
        &[44.0 / 45.0, -56.0 / 15.0, 32.0 / 9.0],
        &[19372.0 / 6561.0, -25360.0 / 2187.0, 64448.0 / 6561.0, -212.0 / 729.0],
        &[
            9017.0 / 3168.0,
            -355.0 / 33.0,
            46732.0 / 5247.0,
            49.0 / 176.0,
            -5103.0 / 18656.0,
        ],
        &[
            35.0 / 384.0,
            0.0,
            500.0 / 1113.0,
            125.0 / 192.0,
            -2187.0 / 6784.0,
            11.0 / 84.0,
        ],
    ],
    b: &[
        35.0 / 384.0,
        0.0,
        500.0 / 1113.0,
        125.0 / 192.0,
        -2187.0 / 6784.0,
        11.0 / 84.0,
        0.0,
    ],
    e: &[
        35.0 / 384.0 - 5179.0 / 57600.0,
        0.0,
        500.0 / 1113.0 - 7571.0 / 16695.0,
        125.0 / 192.0 - 393.0 / 640.0,
        -2187.0 / 6784.0 + 92097.0 / 339200.0,
        11.0 / 84.0 - 187.0 / 2100.0,
        -1.0 / 40.0,
    ],
    error_order: 4,
};

/// Cash-Karp 5(4).
pub const CASH_KARP_45: Tableau = Tableau {
    c: &[0.0, 1.0 / 5.0, 3.0 / 10.0, 3.0 / 5.0, 1.0, 7.0 / 8.0],
    a: &[
        &[],
        &[1.0 / 5.0],
        &[3.0 / 40.0, 9.0 / 40.0],
        &[3.0 / 10.0, -9.0 / 10.0, 6.0 / 5.0],
        &[-11.0 / 54.0, 5.0 / 2.0, -70.0 / 27.0, 35.0 / 27.0],
        &[
            1631.0 / 55296.0,
            175.0 / 512.0,
            575.0 / 13824.0,
            44275.0 / 110592.0,
            253.0 / 4096.0,
        ],
    ],
    b: &[
        37.0 / 378.0,
        0.0,
        250.0 / 621.0,
        125.0 / 594.0,
        0.0,
        512.0 / 1771.0,
    ],
    e: &[
        37.0 / 378.0 - 2825.0 / 27648.0,
        0.0,
        250.0 / 621.0 - 18575.0 / 48384.0,
        125.0 / 594.0 - 13525.0 / 55296.0,
        -277.0 / 14336.0,
        512.0 / 1771.0 - 1.0 / 4.0,
    ],
    error_order: 4,
};

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    fn check_consistency(tab: &Tableau) {
        assert_eq!(tab.a.len(), tab.stages());
        assert_eq!(tab.b.len(), tab.stages());
        assert_eq!(tab.e.len(), tab.stages());
        for (i, row) in tab.a.iter().enumerate() {
            assert_eq!(row.len(), i);
            assert_approx_eq!(row.iter().sum::<Real>(), tab.c[i], 1e-14);
        }
        assert_approx_eq!(tab.b.iter().sum::<Real>(), 1.0, 1e-14);
        assert_approx_eq!(tab.e.iter().sum::<Real>(), 0.0, 1e-14);
    }

    #[test]
    fn dormand_prince_is_consistent() {
        check_consistency(&DORMAND_PRINCE_45);
    }

    #[test]
    fn cash_karp_is_consistent() {
        check_consistency(&CASH_KARP_45);
    }
}
