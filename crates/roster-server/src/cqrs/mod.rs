//! Mediator registration
//!
//! Routes call each slice's `handle` function directly with their feature state.
//! [`build_mediator`] wires the same handlers into one [`DefaultAsyncMediator`] for
//! callers outside the HTTP layer; its test checks that every command and query
//! resolves to a handler.

pub use mediator::DefaultAsyncMediator;

use crate::features::FeatureState;

pub mod middleware;

pub type AppMediator = DefaultAsyncMediator;

pub fn build_mediator(state: &FeatureState) -> AppMediator {
    let store = state.store.clone();
    let cache = state.cache.clone();
    let pipeline = state.pipeline.clone();
    let jobs = state.jobs.clone();

    DefaultAsyncMediator::builder()
        // Employees
        .add_handler({
            let (store, cache) = (store.clone(), cache.clone());
            move |cmd| {
                let (store, cache) = (store.clone(), cache.clone());
                async move { crate::features::employees::commands::create::handle(store, cache, cmd).await }
            }
        })
        .add_handler({
            let (store, cache) = (store.clone(), cache.clone());
            move |cmd| {
                let (store, cache) = (store.clone(), cache.clone());
                async move { crate::features::employees::commands::update::handle(store, cache, cmd).await }
            }
        })
        .add_handler({
            let (store, cache) = (store.clone(), cache.clone());
            move |cmd| {
                let (store, cache) = (store.clone(), cache.clone());
                async move { crate::features::employees::commands::delete::handle(store, cache, cmd).await }
            }
        })
        .add_handler({
            let (store, cache) = (store.clone(), cache.clone());
            move |query| {
                let (store, cache) = (store.clone(), cache.clone());
                async move { crate::features::employees::queries::get::handle(store, cache, query).await }
            }
        })
        .add_handler({
            let (store, cache) = (store.clone(), cache.clone());
            move |query| {
                let (store, cache) = (store.clone(), cache.clone());
                async move { crate::features::employees::queries::list::handle(store, cache, query).await }
            }
        })
        // Uploads
        .add_handler({
            let pipeline = pipeline.clone();
            move |cmd| {
                let pipeline = pipeline.clone();
                async move { crate::features::uploads::commands::upload::handle(pipeline, cmd).await }
            }
        })
        .add_handler({
            let jobs = jobs.clone();
            move |cmd| {
                let jobs = jobs.clone();
                async move { crate::features::uploads::commands::submit::handle(jobs, cmd).await }
            }
        })
        .add_handler({
            let pipeline = pipeline.clone();
            move |query| {
                let pipeline = pipeline.clone();
                async move {
                    crate::features::uploads::queries::validate_structure::handle(pipeline, query).await
                }
            }
        })
        // Jobs
        .add_handler({
            let jobs = jobs.clone();
            move |query| {
                let jobs = jobs.clone();
                async move { crate::features::jobs::queries::get_job::handle(jobs, query).await }
            }
        })
        .build()
}
