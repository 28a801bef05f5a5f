pub mod db_utils;
pub mod digest;
pub mod error;
pub mod i18n;
