//! Conversions between British National Grid coordinates and geographic positions.
//!
//! The grid is a Transverse Mercator projection of the Airy 1830 ellipsoid
//! (OSGB36 datum). Grid coordinates are first unprojected to OSGB36 latitude and
//! longitude with the Krüger series (Karney 2011, sixth order in `n`). Then a
//! seven-parameter Helmert shift moves them onto WGS84.

use crate::domain::model::{GeoPosition, GridPosition};

const SERIES_ORDER: usize = 6;
const NEWTON_MAX_ITERATIONS: usize = 8;
const CARTESIAN_MAX_ITERATIONS: usize = 12;
const ARC_SECONDS_TO_RADIANS: f64 = std::f64::consts::PI / (180.0 * 3600.0);

/// Reference ellipsoid given by semi-major axis and inverse flattening.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ellipsoid {
    pub semi_major_axis: f64,
    pub inverse_flattening: f64,
}

impl Ellipsoid {
    pub const AIRY_1830: Ellipsoid = Ellipsoid {
        semi_major_axis: 6_377_563.396,
        inverse_flattening: 299.324_964_6,
    };

    pub const WGS84: Ellipsoid = Ellipsoid {
        semi_major_axis: 6_378_137.0,
        inverse_flattening: 298.257_223_563,
    };

    pub fn flattening(&self) -> f64 {
        1.0 / self.inverse_flattening
    }

    pub fn eccentricity_squared(&self) -> f64 {
        let f = self.flattening();
        f * (2.0 - f)
    }

    fn to_cartesian(&self, point: &Geodetic) -> [f64; 3] {
        let a = self.semi_major_axis;
        let e2 = self.eccentricity_squared();
        let phi = point.latitude.to_radians();
        let lambda = point.longitude.to_radians();
        let nu = a / (1.0 - e2 * phi.sin().powi(2)).sqrt();

        [
            (nu + point.height) * phi.cos() * lambda.cos(),
            (nu + point.height) * phi.cos() * lambda.sin(),
            (nu * (1.0 - e2) + point.height) * phi.sin(),
        ]
    }

    fn to_geodetic(&self, [x, y, z]: [f64; 3]) -> Geodetic {
        let a = self.semi_major_axis;
        let e2 = self.eccentricity_squared();
        let p = x.hypot(y);
        let lambda = y.atan2(x);

        let prime_vertical = |phi: f64| a / (1.0 - e2 * phi.sin().powi(2)).sqrt();
        let height_at = |phi: f64| {
            let nu = prime_vertical(phi);
            if phi.cos().abs() > 1e-10 {
                p / phi.cos() - nu
            } else {
                z / phi.sin() - nu * (1.0 - e2)
            }
        };

        let mut phi = z.atan2(p * (1.0 - e2));
        for _ in 0..CARTESIAN_MAX_ITERATIONS {
            let nu = prime_vertical(phi);
            let h = height_at(phi);
            let next = z.atan2(p * (1.0 - e2 * nu / (nu + h)));
            let delta = (next - phi).abs();
            phi = next;
            if delta < 1e-15 {
                break;
            }
        }

        Geodetic {
            latitude: phi.to_degrees(),
            longitude: lambda.to_degrees(),
            height: height_at(phi),
        }
    }
}

/// Geographic position with ellipsoidal height, used while crossing datums.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Geodetic {
    pub latitude: f64,
    pub longitude: f64,
    pub height: f64,
}

impl Geodetic {
    pub fn on_surface(position: GeoPosition) -> Self {
        Self {
            latitude: position.latitude,
            longitude: position.longitude,
            height: 0.0,
        }
    }

    pub fn position(&self) -> GeoPosition {
        GeoPosition::new(self.latitude, self.longitude)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransverseMercatorParams {
    pub ellipsoid: Ellipsoid,
    pub latitude_of_origin: f64,
    pub central_meridian: f64,
    pub scale_factor: f64,
    pub false_easting: f64,
    pub false_northing: f64,
}

impl TransverseMercatorParams {
    /// `+proj=tmerc +lat_0=49 +lon_0=-2 +k=0.9996012717 +x_0=400000 +y_0=-100000 +ellps=airy`
    pub const NATIONAL_GRID: TransverseMercatorParams = TransverseMercatorParams {
        ellipsoid: Ellipsoid::AIRY_1830,
        latitude_of_origin: 49.0,
        central_meridian: -2.0,
        scale_factor: 0.999_601_271_7,
        false_easting: 400_000.0,
        false_northing: -100_000.0,
    };
}

#[derive(Debug, Clone)]
pub struct TransverseMercator {
    params: TransverseMercatorParams,
    eccentricity: f64,
    /// k0 times the rectifying radius
    scaled_radius: f64,
    alpha: [f64; SERIES_ORDER],
    beta: [f64; SERIES_ORDER],
    northing_of_origin: f64,
}

impl TransverseMercator {
    pub fn new(params: TransverseMercatorParams) -> Self {
        let f = params.ellipsoid.flattening();
        let n = f / (2.0 - f);
        let (n2, n3, n4, n5, n6) = (n * n, n.powi(3), n.powi(4), n.powi(5), n.powi(6));

        let rectifying_radius = params.ellipsoid.semi_major_axis / (1.0 + n)
            * (1.0 + n2 / 4.0 + n4 / 64.0 + n6 / 256.0);

        let alpha = [
            n / 2.0 - 2.0 * n2 / 3.0 + 5.0 * n3 / 16.0 + 41.0 * n4 / 180.0 - 127.0 * n5 / 288.0
                + 7891.0 * n6 / 37800.0,
            13.0 * n2 / 48.0 - 3.0 * n3 / 5.0 + 557.0 * n4 / 1440.0 + 281.0 * n5 / 630.0
                - 1_983_433.0 * n6 / 1_935_360.0,
            61.0 * n3 / 240.0 - 103.0 * n4 / 140.0 + 15061.0 * n5 / 26880.0
                + 167_603.0 * n6 / 181_440.0,
            49561.0 * n4 / 161_280.0 - 179.0 * n5 / 168.0 + 6_601_661.0 * n6 / 7_257_600.0,
            34729.0 * n5 / 80640.0 - 3_418_889.0 * n6 / 1_995_840.0,
            212_378_941.0 * n6 / 319_334_400.0,
        ];

        let beta = [
            n / 2.0 - 2.0 * n2 / 3.0 + 37.0 * n3 / 96.0 - n4 / 360.0 - 81.0 * n5 / 512.0
                + 96199.0 * n6 / 604_800.0,
            n2 / 48.0 + n3 / 15.0 - 437.0 * n4 / 1440.0 + 46.0 * n5 / 105.0
                - 1_118_711.0 * n6 / 3_870_720.0,
            17.0 * n3 / 480.0 - 37.0 * n4 / 840.0 - 209.0 * n5 / 4480.0 + 5569.0 * n6 / 90720.0,
            4397.0 * n4 / 161_280.0 - 11.0 * n5 / 504.0 - 830_251.0 * n6 / 7_257_600.0,
            4583.0 * n5 / 161_280.0 - 108_847.0 * n6 / 3_991_680.0,
            20_648_693.0 * n6 / 638_668_800.0,
        ];

        let mut projection = Self {
            params,
            eccentricity: params.ellipsoid.eccentricity_squared().sqrt(),
            scaled_radius: params.scale_factor * rectifying_radius,
            alpha,
            beta,
            northing_of_origin: 0.0,
        };

        // 原點緯度在中央經線上的北距
        let tau0 = projection.conformal_tan(params.latitude_of_origin.to_radians().tan());
        let xi0 = tau0.atan();
        let xi0 = xi0
            + (0..SERIES_ORDER)
                .map(|j| projection.alpha[j] * (2.0 * (j + 1) as f64 * xi0).sin())
                .sum::<f64>();
        projection.northing_of_origin = projection.scaled_radius * xi0;

        projection
    }

    pub fn national_grid() -> Self {
        Self::new(TransverseMercatorParams::NATIONAL_GRID)
    }

    /// Geographic position on this projection's ellipsoid to grid coordinates.
    pub fn forward(&self, position: GeoPosition) -> GridPosition {
        let phi = position.latitude.to_radians();
        let lambda = (position.longitude - self.params.central_meridian).to_radians();

        let tau_p = self.conformal_tan(phi.tan());
        let xi_p = tau_p.atan2(lambda.cos());
        let eta_p = (lambda.sin() / tau_p.hypot(lambda.cos())).asinh();

        let (mut xi, mut eta) = (xi_p, eta_p);
        for (j, alpha) in self.alpha.iter().enumerate() {
            let k = 2.0 * (j + 1) as f64;
            xi += alpha * (k * xi_p).sin() * (k * eta_p).cosh();
            eta += alpha * (k * xi_p).cos() * (k * eta_p).sinh();
        }

        GridPosition::new(
            self.params.false_easting + self.scaled_radius * eta,
            self.params.false_northing + self.scaled_radius * xi - self.northing_of_origin,
        )
    }

    /// Grid coordinates to a geographic position on this projection's ellipsoid.
    pub fn inverse(&self, grid: GridPosition) -> GeoPosition {
        let xi = (grid.northing - self.params.false_northing + self.northing_of_origin)
            / self.scaled_radius;
        let eta = (grid.easting - self.params.false_easting) / self.scaled_radius;

        let (mut xi_p, mut eta_p) = (xi, eta);
        for (j, beta) in self.beta.iter().enumerate() {
            let k = 2.0 * (j + 1) as f64;
            xi_p -= beta * (k * xi).sin() * (k * eta).cosh();
            eta_p -= beta * (k * xi).cos() * (k * eta).sinh();
        }

        let tau_p = xi_p.sin() / eta_p.sinh().hypot(xi_p.cos());
        let lambda = eta_p.sinh().atan2(xi_p.cos());
        let tau = self.geodetic_tan(tau_p);

        GeoPosition::new(
            tau.atan().to_degrees(),
            self.params.central_meridian + lambda.to_degrees(),
        )
    }

    /// tan of the conformal latitude for a given tan of geodetic latitude
    fn conformal_tan(&self, tau: f64) -> f64 {
        let e = self.eccentricity;
        let tau1 = 1.0_f64.hypot(tau);
        let sigma = (e * (e * tau / tau1).atanh()).sinh();
        1.0_f64.hypot(sigma) * tau - sigma * tau1
    }

    /// Newton inversion of `conformal_tan`, converges in two or three steps.
    fn geodetic_tan(&self, tau_p: f64) -> f64 {
        let e2m = 1.0 - self.eccentricity * self.eccentricity;
        let mut tau = tau_p / e2m;
        for _ in 0..NEWTON_MAX_ITERATIONS {
            let tau_pa = self.conformal_tan(tau);
            let delta = (tau_p - tau_pa) / 1.0_f64.hypot(tau_pa) * (1.0 + e2m * tau * tau)
                / (e2m * 1.0_f64.hypot(tau));
            tau += delta;
            if delta.is_nan() || delta.abs() < f64::EPSILON * tau.abs().max(1.0) {
                break;
            }
        }
        tau
    }
}

/// Seven-parameter position-vector Helmert transform between geocentric frames.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HelmertTransform {
    pub translation: [f64; 3],
    /// rotations about x, y, z in arc seconds
    pub rotation_arcsec: [f64; 3],
    pub scale_ppm: f64,
}

impl HelmertTransform {
    /// `+towgs84=446.448,-125.157,542.060,0.1502,0.2470,0.8421,-20.4894`
    pub const OSGB36_TO_WGS84: HelmertTransform = HelmertTransform {
        translation: [446.448, -125.157, 542.060],
        rotation_arcsec: [0.1502, 0.2470, 0.8421],
        scale_ppm: -20.4894,
    };

    fn matrix(&self) -> [[f64; 3]; 3] {
        let [rx, ry, rz] = self.rotation_arcsec.map(|r| r * ARC_SECONDS_TO_RADIANS);
        let m = 1.0 + self.scale_ppm * 1e-6;
        [
            [m, -m * rz, m * ry],
            [m * rz, m, -m * rx],
            [-m * ry, m * rx, m],
        ]
    }

    pub fn apply(&self, point: [f64; 3]) -> [f64; 3] {
        let r = self.matrix();
        let t = self.translation;
        [
            t[0] + r[0][0] * point[0] + r[0][1] * point[1] + r[0][2] * point[2],
            t[1] + r[1][0] * point[0] + r[1][1] * point[1] + r[1][2] * point[2],
            t[2] + r[2][0] * point[0] + r[2][1] * point[1] + r[2][2] * point[2],
        ]
    }

    /// Exact inverse of [`apply`](Self::apply), solved with Cramer's rule.
    pub fn invert(&self, point: [f64; 3]) -> [f64; 3] {
        let r = self.matrix();
        let b = [
            point[0] - self.translation[0],
            point[1] - self.translation[1],
            point[2] - self.translation[2],
        ];
        let det = determinant(&r);
        let mut solved = [0.0; 3];
        for (column, value) in solved.iter_mut().enumerate() {
            let mut replaced = r;
            for row in 0..3 {
                replaced[row][column] = b[row];
            }
            *value = determinant(&replaced) / det;
        }
        solved
    }
}

fn determinant(m: &[[f64; 3]; 3]) -> f64 {
    m[0][0] * (m[1][1] * m[2][2] - m[1][2] * m[2][1])
        - m[0][1] * (m[1][0] * m[2][2] - m[1][2] * m[2][0])
        + m[0][2] * (m[1][0] * m[2][1] - m[1][1] * m[2][0])
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DatumShift {
    pub source: Ellipsoid,
    pub target: Ellipsoid,
    pub helmert: HelmertTransform,
}

impl DatumShift {
    pub const OSGB36_TO_WGS84: DatumShift = DatumShift {
        source: Ellipsoid::AIRY_1830,
        target: Ellipsoid::WGS84,
        helmert: HelmertTransform::OSGB36_TO_WGS84,
    };

    pub fn apply(&self, point: Geodetic) -> Geodetic {
        let cartesian = self.source.to_cartesian(&point);
        self.target.to_geodetic(self.helmert.apply(cartesian))
    }

    pub fn invert(&self, point: Geodetic) -> Geodetic {
        let cartesian = self.target.to_cartesian(&point);
        self.source.to_geodetic(self.helmert.invert(cartesian))
    }
}

/// National Grid to WGS84 in one step, the conversion every marker goes through.
#[derive(Debug, Clone)]
pub struct GridTransform {
    projection: TransverseMercator,
    datum_shift: Option<DatumShift>,
}

impl GridTransform {
    pub fn new(projection: TransverseMercator, datum_shift: Option<DatumShift>) -> Self {
        Self {
            projection,
            datum_shift,
        }
    }

    pub fn osgb36_to_wgs84() -> Self {
        Self::new(
            TransverseMercator::national_grid(),
            Some(DatumShift::OSGB36_TO_WGS84),
        )
    }

    /// Bare projection: output stays on the OSGB36 datum.
    pub fn without_datum_shift() -> Self {
        Self::new(TransverseMercator::national_grid(), None)
    }

    pub fn from_settings(apply_datum_shift: bool) -> Self {
        if apply_datum_shift {
            Self::osgb36_to_wgs84()
        } else {
            Self::without_datum_shift()
        }
    }

    pub fn applies_datum_shift(&self) -> bool {
        self.datum_shift.is_some()
    }

    pub fn to_geographic(&self, grid: GridPosition) -> GeoPosition {
        let local = self.projection.inverse(grid);
        match &self.datum_shift {
            Some(shift) => shift.apply(Geodetic::on_surface(local)).position(),
            None => local,
        }
    }

    /// Inverse of [`to_geographic`](Self::to_geographic) for points on the grid's ellipsoid surface.
    pub fn to_grid(&self, position: GeoPosition) -> GridPosition {
        let local = match &self.datum_shift {
            Some(shift) => {
                // 找出使 OSGB36 高度為零的 WGS84 橢球高
                let mut height = 0.0;
                let mut local = shift.invert(Geodetic::on_surface(position));
                for _ in 0..3 {
                    height -= local.height;
                    local = shift.invert(Geodetic {
                        latitude: position.latitude,
                        longitude: position.longitude,
                        height,
                    });
                }
                local.position()
            }
            None => position,
        };
        self.projection.forward(local)
    }
}

impl Default for GridTransform {
    fn default() -> Self {
        Self::osgb36_to_wgs84()
    }
}
