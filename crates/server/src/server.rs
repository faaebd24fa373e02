use axum::{
    Router,
    routing::{get, post, put},
};

use std::sync::Arc;

use crate::{catalog, entitlements, ledger, members, payments};
use engine::Engine;

#[derive(Clone)]
pub struct ServerState {
    pub engine: Arc<Engine>,
}

pub fn router(state: ServerState) -> Router {
    let api = Router::new()
        .route("/members", post(members::member_new).get(members::list))
        .route(
            "/members/{member_id}",
            get(members::get).patch(members::update),
        )
        .route(
            "/members/{member_id}/deactivate",
            post(members::deactivate),
        )
        .route(
            "/members/{member_id}/rights",
            get(entitlements::rights_of_member),
        )
        .route(
            "/members/{member_id}/obligations",
            get(entitlements::obligations_of_member),
        )
        .route("/rights", post(catalog::right_new).get(catalog::rights))
        .route(
            "/rights/{right_id}",
            get(catalog::right)
                .patch(catalog::rename_right)
                .delete(catalog::delete_right),
        )
        .route("/rights/{right_id}/enable", post(catalog::enable_right))
        .route("/rights/{right_id}/disable", post(catalog::disable_right))
        .route("/rights/{right_id}/dues", get(catalog::dues_of_right))
        .route(
            "/rights/{right_id}/dues/{due_id}",
            put(catalog::link).delete(catalog::unlink),
        )
        .route("/dues", post(catalog::due_new).get(catalog::dues))
        .route(
            "/dues/{due_id}",
            get(catalog::due)
                .patch(catalog::update_due)
                .delete(catalog::delete_due),
        )
        .route("/assignments", post(entitlements::assign_right))
        .route(
            "/assignments/{member_id}/{right_id}",
            axum::routing::patch(entitlements::update_assignment)
                .delete(entitlements::revoke_right),
        )
        .route("/obligations", post(entitlements::assign_due))
        .route(
            "/obligations/{member_id}/{due_id}",
            get(payments::obligation_status),
        )
        .route(
            "/obligations/{member_id}/{due_id}/payments",
            get(payments::payments_of_obligation),
        )
        .route("/payments", post(payments::payment_new).get(payments::list))
        .route(
            "/payments/{payment_id}",
            get(payments::get).delete(payments::delete),
        )
        .route("/incomes", post(ledger::income_new).get(ledger::incomes))
        .route(
            "/incomes/{income_id}",
            get(ledger::income)
                .patch(ledger::update_income)
                .delete(ledger::delete_income),
        )
        .route("/expenses", post(ledger::expense_new).get(ledger::expenses))
        .route(
            "/expenses/{expense_id}",
            get(ledger::expense)
                .patch(ledger::update_expense)
                .delete(ledger::delete_expense),
        )
        .route("/funds", get(ledger::funds))
        .route("/funds/recompute", post(ledger::recompute));

    Router::new().nest("/api", api).with_state(state)
}

pub async fn run_with_listener(
    engine: Engine,
    listener: tokio::net::TcpListener,
) -> Result<(), std::io::Error> {
    let addr = listener.local_addr()?;
    tracing::info!("Server listening on {}", addr);

    let state = ServerState {
        engine: Arc::new(engine),
    };

    axum::serve(listener, router(state)).await
}
