//! Boundaries to collaborators the service does not implement itself:
//! object storage for photo bytes and reverse geocoding for sighting
//! locations. Authentication lives upstream; handlers receive the acting
//! user id explicitly.

pub mod geocoding;
pub mod storage;
