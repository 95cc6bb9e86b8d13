//! Distance Calculator
//! 2地点間の大圏距離 (ハーバーサイン公式)

/// 地球の半径 (km)
const EARTH_RADIUS_KM: f64 = 6371.0;

/// 2つの緯度経度 (度単位) 間の大圏距離を km で返す
pub fn haversine_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let d_lat = (lat2 - lat1).to_radians();
    let d_lon = (lon2 - lon1).to_radians();

    let a = (d_lat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (d_lon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_KM * c
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_distance_for_identical_points() {
        assert_eq!(haversine_km(32.0, 34.0, 32.0, 34.0), 0.0);
    }

    #[test]
    fn known_distance_tel_aviv_to_jerusalem() {
        // テルアビブ → エルサレム はおよそ 54km
        let d = haversine_km(32.0853, 34.7818, 31.7683, 35.2137);
        assert!((d - 54.0).abs() < 2.0, "distance was {d}");
    }

    #[test]
    fn distance_is_symmetric() {
        let d1 = haversine_km(32.0, 34.0, 31.5, 34.5);
        let d2 = haversine_km(31.5, 34.5, 32.0, 34.0);
        assert!((d1 - d2).abs() < 1e-9);
    }

    #[test]
    fn one_degree_of_latitude_is_about_111_km() {
        let d = haversine_km(32.0, 34.0, 33.0, 34.0);
        assert!((d - 111.2).abs() < 0.5, "distance was {d}");
    }
}
