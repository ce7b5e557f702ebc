pub mod datetime;
pub mod jwt_auth;
pub mod url_normalize;
