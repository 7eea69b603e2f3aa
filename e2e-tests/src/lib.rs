//! End-to-end test crate for the RouteSaver API.
//! The actual flows live under `tests/`.
