/*!
 * Lifecycle Tests
 * Handle open/rebind/close behavior through the public API
 */

mod common;

use common::{MockConnection, MockState, StateRef};
use pretty_assertions::assert_eq;
use std::rc::Rc;
use tether::{HandleError, HandleServices, LogicalHandle, NullSink, ProxyBuilder};

fn quiet_services() -> HandleServices {
    HandleServices::new().with_sink(NullSink)
}

fn open_handle(state: &StateRef) -> Rc<LogicalHandle<MockConnection>> {
    LogicalHandle::open(MockConnection::new(state), quiet_services())
}

#[test]
fn end_to_end_close_invalidates_everything() {
    let _ = env_logger::builder().is_test(true).try_init();

    let state = MockState::new();
    let handle = open_handle(&state);
    let conn = ProxyBuilder::build_connection(&handle);

    let s1 = conn.create_statement().unwrap();
    let s2 = conn.create_statement().unwrap();
    assert_eq!(handle.resource_count(), 2);
    assert!(handle.is_registered(s1.id()));
    assert!(handle.is_registered(s2.id()));

    handle.close().unwrap();

    assert!(s1.execute("DELETE FROM t").unwrap_err().is_invalid_handle());
    assert!(s2.query("SELECT 1").unwrap_err().is_invalid_handle());
    assert!(conn.commit().unwrap_err().is_invalid_handle());
    assert_eq!(handle.resource_count(), 0);
    assert_eq!(state.statement_close_attempts.get(), 2);
    assert!(state.connection_closed.get());

    // second close is a no-op
    assert!(handle.close().is_ok());
}

#[test]
fn derived_proxies_share_the_parent_guard() {
    let state = MockState::new();
    let handle = open_handle(&state);
    let conn = ProxyBuilder::build_connection(&handle);

    let stmt = conn.create_statement().unwrap();
    let meta = conn.database_metadata().unwrap();
    assert!(stmt.is_open());
    assert_eq!(meta.product_name().unwrap(), "MockDB");

    // invalidating the connection-level proxy reaches every derived
    // proxy without touching them individually
    conn.close();

    assert!(stmt.execute("SELECT 1").unwrap_err().is_invalid_handle());
    assert!(meta.product_name().unwrap_err().is_invalid_handle());
    assert!(!stmt.is_open());
}

#[test]
fn proxy_close_leaves_the_handle_open() {
    let state = MockState::new();
    let handle = open_handle(&state);
    let conn = ProxyBuilder::build_connection(&handle);
    let _stmt = conn.create_statement().unwrap();

    conn.close();
    conn.close(); // idempotent

    assert!(!conn.is_valid());
    assert!(handle.is_open());
    assert_eq!(handle.resource_count(), 1);

    // the handle's own close still releases what the proxy left behind
    handle.close().unwrap();
    assert_eq!(handle.resource_count(), 0);
    assert_eq!(state.statement_close_attempts.get(), 1);
}

#[test]
fn statement_close_deregisters_and_is_idempotent() {
    let state = MockState::new();
    let handle = open_handle(&state);
    let conn = ProxyBuilder::build_connection(&handle);

    let stmt = conn.create_statement().unwrap();
    let sibling = conn.create_statement().unwrap();
    assert_eq!(handle.resource_count(), 2);

    stmt.close().unwrap();
    assert!(!handle.is_registered(stmt.id()));
    assert_eq!(handle.resource_count(), 1);
    assert!(stmt.execute("SELECT 1").unwrap_err().is_invalid_handle());

    // closing again is a safe no-op, and the sibling is untouched
    stmt.close().unwrap();
    assert_eq!(state.statement_close_attempts.get(), 1);
    assert_eq!(sibling.execute("SELECT 1").unwrap(), 1);
}

#[test]
fn rebinding_keeps_identity_and_restores_service() {
    let state = MockState::new();
    let handle = open_handle(&state);
    let conn = ProxyBuilder::build_connection(&handle);
    let id = handle.id();

    assert!(conn.commit().is_ok());

    // detached but open: operations fail with Unbound, not InvalidHandle
    let released = handle.release_physical();
    assert!(released.is_some());
    assert!(handle.is_open());
    assert_eq!(
        conn.commit().unwrap_err(),
        HandleError::Unbound { handle: id }
    );

    handle.bind_physical(MockConnection::new(&state)).unwrap();
    assert_eq!(handle.id(), id);
    assert!(conn.commit().is_ok());
}

#[test]
fn close_without_binding_succeeds() {
    let state = MockState::new();
    let handle = open_handle(&state);
    handle.release_physical();

    handle.close().unwrap();
    assert!(!handle.is_open());
    assert!(!state.connection_closed.get());
}

#[test]
fn prepared_and_callable_statements_are_tracked() {
    let state = MockState::new();
    let handle = open_handle(&state);
    let conn = ProxyBuilder::build_connection(&handle);

    let prepared = conn.prepare_statement("SELECT * FROM t WHERE id = ?").unwrap();
    let callable = conn.prepare_call("CALL audit(?)").unwrap();
    assert_eq!(handle.resource_count(), 2);
    assert_eq!(prepared.sql(), "SELECT * FROM t WHERE id = ?");
    assert_eq!(callable.sql(), "CALL audit(?)");

    handle.close().unwrap();

    assert!(prepared.execute().unwrap_err().is_invalid_handle());
    assert!(callable.execute().unwrap_err().is_invalid_handle());
    assert_eq!(handle.resource_count(), 0);
}
