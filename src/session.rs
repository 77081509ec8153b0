// oltctl - CLI dashboard for ZTE OLT monitoring via the snmp-zte query API
// Copyright (C) 2025 oltctl contributors
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

//! Session-scoped result state.
//!
//! A session owns one connection context and one result slot. The slot is
//! cleared at the start of every attempt and written through a ticket, so
//! a reply that resolves after a newer attempt started, or after the
//! connection was replaced, is discarded instead of clobbering the slot.

use std::sync::atomic::{AtomicU64, Ordering};

use crate::client::QueryReply;
use crate::request::ConnectionContext;

static NEXT_CONTEXT_ID: AtomicU64 = AtomicU64::new(1);

/// Captured at the start of an attempt; a commit is honored only while
/// the ticket is still current.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket {
    context_id: u64,
    seq: u64,
}

#[derive(Debug)]
pub struct Session {
    context: ConnectionContext,
    context_id: u64,
    seq: u64,
    result: Option<QueryReply>,
}

impl Session {
    pub fn connect(context: ConnectionContext) -> Self {
        Session {
            context,
            context_id: NEXT_CONTEXT_ID.fetch_add(1, Ordering::Relaxed),
            seq: 0,
            result: None,
        }
    }

    pub fn context(&self) -> &ConnectionContext {
        &self.context
    }

    /// Starts a query attempt: clears the slot (stale data must not show
    /// while a request is pending) and hands out the ticket for it.
    pub fn begin(&mut self) -> Ticket {
        self.seq += 1;
        self.result = None;
        Ticket {
            context_id: self.context_id,
            seq: self.seq,
        }
    }

    /// Stores the reply if the ticket is still current. Returns whether
    /// the commit was honored.
    pub fn commit(&mut self, ticket: Ticket, reply: QueryReply) -> bool {
        if ticket.context_id != self.context_id || ticket.seq != self.seq {
            return false;
        }
        self.result = Some(reply);
        true
    }

    pub fn result(&self) -> Option<&QueryReply> {
        self.result.as_ref()
    }

    /// Replaces the connection wholesale. The slot is dropped and every
    /// outstanding ticket becomes stale.
    pub fn reconnect(&mut self, context: ConnectionContext) {
        self.context = context;
        self.context_id = NEXT_CONTEXT_ID.fetch_add(1, Ordering::Relaxed);
        self.seq = 0;
        self.result = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::DeviceModel;
    use serde_json::json;

    fn context(host: &str) -> ConnectionContext {
        ConnectionContext {
            host: host.into(),
            port: 161,
            community: "public".into(),
            model: DeviceModel::C320,
            username: "admin".into(),
            password: "secret".into(),
        }
    }

    fn reply(tag: &str) -> QueryReply {
        QueryReply {
            query: "onu_list".into(),
            data: json!([{"name": tag}]),
            timestamp: "2024-01-01T00:00:00Z".into(),
            duration: "12ms".into(),
            summary: None,
        }
    }

    #[test]
    fn begin_clears_the_slot() {
        let mut session = Session::connect(context("10.0.0.1"));
        let ticket = session.begin();
        assert!(session.commit(ticket, reply("first")));
        assert!(session.result().is_some());

        let _pending = session.begin();
        assert!(session.result().is_none());
    }

    #[test]
    fn superseded_ticket_is_discarded() {
        let mut session = Session::connect(context("10.0.0.1"));
        let first = session.begin();
        let second = session.begin();

        // first resolves late, after a newer attempt started
        assert!(!session.commit(first, reply("stale")));
        assert!(session.result().is_none());

        assert!(session.commit(second, reply("current")));
        assert_eq!(session.result().unwrap().data[0]["name"], "current");
    }

    #[test]
    fn reconnect_invalidates_in_flight_tickets() {
        let mut session = Session::connect(context("10.0.0.1"));
        let ticket = session.begin();

        session.reconnect(context("10.0.0.2"));
        assert!(!session.commit(ticket, reply("stale")));
        assert!(session.result().is_none());
        assert_eq!(session.context().host, "10.0.0.2");
    }

    #[test]
    fn commit_twice_on_same_ticket_is_idempotent_for_the_slot() {
        let mut session = Session::connect(context("10.0.0.1"));
        let ticket = session.begin();
        assert!(session.commit(ticket, reply("a")));
        // the ticket is still the newest attempt, so a second resolve wins
        assert!(session.commit(ticket, reply("b")));
        assert_eq!(session.result().unwrap().data[0]["name"], "b");
    }
}
