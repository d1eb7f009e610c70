pub mod firestore;
pub mod google_auth;
pub mod libsql;
