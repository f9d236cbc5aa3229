//! JWT token issue/validation, cookie builders and the request identity
//! extractor shared by the Gilt API.

pub mod cookie;
pub mod identity;
pub mod token;
