use crate::flags::FlagSource;
use crate::weather::WeatherClient;

pub struct AppState {
    pub weather: WeatherClient,
    pub flags: FlagSource,
}
