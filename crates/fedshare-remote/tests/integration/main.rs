//! Integration tests for fedshare-remote
//!
//! Uses wiremock to simulate a remote endpoint and verifies how
//! HttpRemoteTransport maps its answers to a RemoteStatus.

mod common;

mod test_probe;
