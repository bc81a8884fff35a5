pub mod constants;
pub mod language_profile;
