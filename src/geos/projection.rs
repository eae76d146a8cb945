//! Universal Transverse Mercator on the WGS84 ellipsoid.
//!
//! Uses the Krüger series to third order in the third flattening, which is
//! sub-millimetre inside a zone. Distances between projected points are in metres.

use geo::Coord;

const WGS84_A: f64 = 6_378_137.0;
const WGS84_F: f64 = 1.0 / 298.257_223_563;
const K0: f64 = 0.9996;
const FALSE_EASTING: f64 = 500_000.0;
const FALSE_NORTHING_SOUTH: f64 = 10_000_000.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Utm {
    zone: u8,
    south: bool,
}

impl Utm {
    /// Northern-hemisphere zone, `EPSG:326{zone}`.
    pub fn north(zone: u8) -> Option<Self> {
        (1..=60).contains(&zone).then_some(Self { zone, south: false })
    }

    /// Southern-hemisphere zone, `EPSG:327{zone}`.
    pub fn south(zone: u8) -> Option<Self> {
        (1..=60).contains(&zone).then_some(Self { zone, south: true })
    }

    /// Parses `32611`, `32733` and the like.
    pub fn from_epsg(code: u32) -> Option<Self> {
        match code {
            32601..=32660 => Self::north((code - 32600) as u8),
            32701..=32760 => Self::south((code - 32700) as u8),
            _ => None,
        }
    }

    pub fn epsg(&self) -> u32 {
        let base = if self.south { 32700 } else { 32600 };
        base + self.zone as u32
    }

    fn central_meridian(&self) -> f64 {
        (self.zone as f64 * 6.0 - 183.0).to_radians()
    }

    fn false_northing(&self) -> f64 {
        if self.south {
            FALSE_NORTHING_SOUTH
        } else {
            0.0
        }
    }

    /// Geographic (x = longitude, y = latitude, degrees) to easting/northing.
    pub fn forward(&self, c: Coord<f64>) -> Coord<f64> {
        let s = Series::wgs84();
        let phi = c.y.to_radians();
        let dlambda = c.x.to_radians() - self.central_meridian();

        let k = 2.0 * s.n.sqrt() / (1.0 + s.n);
        let t = (phi.sin().atanh() - k * (k * phi.sin()).atanh()).sinh();
        let xi_p = t.atan2(dlambda.cos());
        let eta_p = (dlambda.sin() / (1.0 + t * t).sqrt()).atanh();

        let mut xi = xi_p;
        let mut eta = eta_p;
        for (j, alpha) in s.alpha.iter().enumerate() {
            let m = 2.0 * (j as f64 + 1.0);
            xi += alpha * (m * xi_p).sin() * (m * eta_p).cosh();
            eta += alpha * (m * xi_p).cos() * (m * eta_p).sinh();
        }

        Coord {
            x: FALSE_EASTING + K0 * s.big_a * eta,
            y: self.false_northing() + K0 * s.big_a * xi,
        }
    }

    /// Easting/northing back to geographic degrees.
    pub fn inverse(&self, c: Coord<f64>) -> Coord<f64> {
        let s = Series::wgs84();
        let xi = (c.y - self.false_northing()) / (K0 * s.big_a);
        let eta = (c.x - FALSE_EASTING) / (K0 * s.big_a);

        let mut xi_p = xi;
        let mut eta_p = eta;
        for (j, beta) in s.beta.iter().enumerate() {
            let m = 2.0 * (j as f64 + 1.0);
            xi_p -= beta * (m * xi).sin() * (m * eta).cosh();
            eta_p -= beta * (m * xi).cos() * (m * eta).sinh();
        }

        let chi = (xi_p.sin() / eta_p.cosh()).asin();
        let mut phi = chi;
        for (j, delta) in s.delta.iter().enumerate() {
            let m = 2.0 * (j as f64 + 1.0);
            phi += delta * (m * chi).sin();
        }
        let lambda = self.central_meridian() + eta_p.sinh().atan2(xi_p.cos());

        Coord {
            x: lambda.to_degrees(),
            y: phi.to_degrees(),
        }
    }
}

impl Default for Utm {
    /// Zone 11N, which covers Southern California.
    fn default() -> Self {
        Self {
            zone: 11,
            south: false,
        }
    }
}

struct Series {
    n: f64,
    big_a: f64,
    alpha: [f64; 3],
    beta: [f64; 3],
    delta: [f64; 3],
}

impl Series {
    fn wgs84() -> Self {
        let n = WGS84_F / (2.0 - WGS84_F);
        let (n2, n3) = (n * n, n * n * n);

        Self {
            n,
            big_a: WGS84_A / (1.0 + n) * (1.0 + n2 / 4.0 + n2 * n2 / 64.0),
            alpha: [
                n / 2.0 - 2.0 * n2 / 3.0 + 5.0 * n3 / 16.0,
                13.0 * n2 / 48.0 - 3.0 * n3 / 5.0,
                61.0 * n3 / 240.0,
            ],
            beta: [
                n / 2.0 - 2.0 * n2 / 3.0 + 37.0 * n3 / 96.0,
                n2 / 48.0 + n3 / 15.0,
                17.0 * n3 / 480.0,
            ],
            delta: [
                2.0 * n - 2.0 * n2 / 3.0 - 2.0 * n3,
                7.0 * n2 / 3.0 - 8.0 * n3 / 5.0,
                56.0 * n3 / 15.0,
            ],
        }
    }
}
