mod calendar;
mod roadmap;

pub use calendar::CalendarEventsHandler;
pub use roadmap::RoadmapSearchHandler;
