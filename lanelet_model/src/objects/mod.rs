pub mod intersection;
pub mod lanelet;
pub mod traffic_light;
pub mod traffic_sign;
