pub mod sdk;

pub use sdk::addresses::{read_addresses, AddressRecord};
pub use sdk::config::MapboxConfig;
pub use sdk::display::MapView;
pub use sdk::routing::{Coordinate, MapProvider, MapboxProvider, RoutePolyline, RoutingError};
pub use sdk::session::{AppState, DisplayState, PendingLookups, ResolvedLookups, Session};
