pub mod dav_server;
