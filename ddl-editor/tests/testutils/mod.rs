//! Test utilities for DDL Editor integration tests
//!
//! `EditorFixture` wires an object graph with a `public` schema, the
//! PostgreSQL editor registry and an empty command context.

pub mod editor_fixture;
