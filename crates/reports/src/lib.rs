//! `geodash-reports`: the dashboard pages as plain data.
//!
//! Each page hardcodes the columns of the sheet it was built for and returns
//! a serializable report; warnings replace the page's on-screen messages.

pub mod aggregate;
pub mod coffee_shops;
pub mod sales;
pub mod traffic;

pub use aggregate::{sum_by, top_n, GroupSums, GroupTotal};
pub use coffee_shops::{CoffeeReport, CoffeeSelection, CoffeeShops, FilterOptions, MapView, StoreLocation};
pub use sales::{sales, SalesReport};
pub use traffic::{available_periods, traffic, DayCount, TrafficReport};
