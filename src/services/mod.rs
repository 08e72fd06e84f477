pub mod forecast;
pub mod formatter;
pub mod intent;
pub mod openweather;
