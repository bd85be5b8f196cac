//! Gen AI on AWS service library
//!
//! Structured user extraction through an LLM, asynchronous dispatch of
//! extraction requests over SQS, a Supabase-backed voice-agent webhook, and
//! the queue worker that consumes the dispatched requests.
//!
//! # Modules
//!
//! - `api`: HTTP-facing handlers and router.
//! - `core`: Domain logic (extraction, phone formatting, worker loop).
//! - `integrations`: External service clients (LLM, SQS, Supabase).
//! - `obs`: Observability and logging.
//! - `config`: Configuration management.
//! - `errors`: Error handling types.
//! - `extraction`: Structured extraction client.
//! - `handlers`: HTTP request handlers and shared state.
//! - `llm_client`: Model-routing LLM completion client.
//! - `models`: Request, response and queue models.
//! - `phone`: Phone number formatting and SMS capability.
//! - `queue`: Queue dispatcher.
//! - `routes`: Router assembly and OpenAPI document.
//! - `supabase_client`: Supabase REST client.
//! - `webhook_handler`: Voice-agent webhook and configuration resolver.
//! - `webhook_models`: Webhook payload models.
//! - `worker`: Queue message processing loop.

pub mod api;
pub mod core;
pub mod integrations;
pub mod obs;

pub mod config;
pub mod errors;
pub mod extraction;
pub mod handlers;
pub mod llm_client;
pub mod models;
pub mod phone;
pub mod queue;
pub mod routes;
pub mod supabase_client;
pub mod webhook_handler;
pub mod webhook_models;
pub mod worker;
