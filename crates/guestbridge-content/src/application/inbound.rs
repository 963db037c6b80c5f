//! Host-side handlers for guest requests.
//!
//! Handlers hold a `Weak` reference to the content context so a registry
//! outliving its scope never keeps the scope alive. Use-case failures are
//! logged; they never become protocol errors.

use std::rc::{Rc, Weak};

use guestbridge_protocol::handler::TypedHandler;
use guestbridge_protocol::messages::inbound::{
    AnnounceVersions, GoToNextState, GoToPreviousState, SetStateData, SetValidationMessage,
    SubmitResults,
};
use guestbridge_protocol::registry::HandlerRegistry;
use tracing::{debug, info, warn};

use crate::application::authoring::{handle_set_validation_message, handle_update_state_data};
use crate::application::context::ContentContext;
use crate::application::navigation::{handle_advance_state, handle_retreat_state};
use crate::domain::commands::{AdvanceState, RetreatState};

fn bind<R: 'static>(
    ctx: &Rc<ContentContext>,
    action: impl Fn(&ContentContext, R) + 'static,
) -> impl Fn(R) + 'static {
    let weak: Weak<ContentContext> = Rc::downgrade(ctx);
    move |request| match weak.upgrade() {
        Some(ctx) => action(&ctx, request),
        None => debug!("content context dropped, ignoring request"),
    }
}

/// Registers every guest-to-host handler of the message catalog against
/// `ctx`.
pub fn register_host_handlers(registry: &HandlerRegistry, ctx: &Rc<ContentContext>) {
    registry.register(TypedHandler::<SubmitResults>::new(bind(
        ctx,
        |ctx, request: SubmitResults| {
            info!(
                scope_id = %ctx.scope_id(),
                result_type = %request.result_type,
                "results submitted"
            );
            ctx.activity().results_submitted(
                ctx.scope_id(),
                &request.result_type,
                &request.result,
                request.description.as_deref(),
            );
        },
    )));

    registry.register(TypedHandler::<GoToNextState>::new(bind(
        ctx,
        |ctx, _request: GoToNextState| {
            if let Err(e) = handle_advance_state(&AdvanceState, ctx) {
                warn!(error = %e, "guest navigation to next state rejected");
            }
        },
    )));

    registry.register(TypedHandler::<GoToPreviousState>::new(bind(
        ctx,
        |ctx, _request: GoToPreviousState| {
            if let Err(e) = handle_retreat_state(&RetreatState, ctx) {
                warn!(error = %e, "guest navigation to previous state rejected");
            }
        },
    )));

    // Outside an edit session the use-case already warns.
    registry.register(TypedHandler::<SetStateData>::new(bind(
        ctx,
        |ctx, request: SetStateData| {
            let _ = handle_update_state_data(request.data, request.asset_refs, ctx);
        },
    )));

    registry.register(TypedHandler::<SetValidationMessage>::new(bind(
        ctx,
        |ctx, request: SetValidationMessage| {
            handle_set_validation_message(request.message, ctx);
        },
    )));

    registry.register(TypedHandler::<AnnounceVersions>::new(bind(
        ctx,
        |ctx, request: AnnounceVersions| {
            for (request_type, version) in request.versions {
                ctx.dispatcher().negotiate(request_type, version);
            }
        },
    )));
}
