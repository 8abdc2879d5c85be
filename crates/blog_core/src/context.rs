//! Request-scoped handle passed into admin workflow calls.
//!
//! # Invariants
//! - One context per inbound request; never stored in process-wide state.
//! - The store connection is borrowed, so release on every exit path is the
//!   caller's scope ending.

use crate::auth::{self, AdminCredentials, AuthError, Authorized, LoginOutcome, SessionStore};
use rusqlite::Connection;

/// Store connection and caller session for one request.
pub struct RequestContext<'a, S: SessionStore + ?Sized> {
    conn: &'a mut Connection,
    session: &'a mut S,
}

impl<'a, S: SessionStore + ?Sized> RequestContext<'a, S> {
    pub fn new(conn: &'a mut Connection, session: &'a mut S) -> Self {
        Self { conn, session }
    }

    pub fn conn(&self) -> &Connection {
        &*self.conn
    }

    pub(crate) fn conn_mut(&mut self) -> &mut Connection {
        &mut *self.conn
    }

    pub fn session(&self) -> &S {
        &*self.session
    }

    /// Runs the authorization gate against this request's session.
    pub fn require_admin(&self) -> Result<Authorized, AuthError> {
        auth::require_admin(&*self.session)
    }

    pub fn login(
        &mut self,
        username: &str,
        password: &str,
        credentials: &AdminCredentials,
    ) -> LoginOutcome {
        auth::login(&mut *self.session, username, password, credentials)
    }

    pub fn logout(&mut self) {
        auth::logout(&mut *self.session);
    }
}
