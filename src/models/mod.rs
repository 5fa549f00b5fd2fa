pub mod classified;
pub mod episode;
pub mod series;
pub mod variable;
pub mod weather;

pub use classified::ClassifiedReading;
pub use episode::Episode;
pub use series::StationSeries;
pub use variable::Variable;
pub use weather::{WeatherRecord, WeatherRecordBuilder};
