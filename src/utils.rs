pub mod map_utils;
pub mod result_utils;
