//! Business operation routes that post through the posting builders.
//!
//! Each responds like `POST /journal-entries`.

use axum::{Router, extract::State, response::Response, routing::post};
use rust_decimal::Decimal;
use serde::Deserialize;

use forgeline_core::ledger::{LedgerError, PostingRequest, chart::codes, postings};
use forgeline_shared::types::AccountCode;

use super::error_response;
use super::journal_entries::post_and_respond;
use crate::{AppState, extractors::ApiJson};

/// Creates the posting helper routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/expenses", post(record_expense))
        .route("/loans", post(record_loan))
        .route("/loans/repayments", post(record_loan_repayment))
        .route("/material-issues", post(record_material_issue))
        .route("/sales/completions", post(record_sale))
        .route("/payments/received", post(record_payment_received))
        .route("/payments/made", post(record_payment_made))
}

/// Request body for `POST /expenses`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpenseRequest {
    /// Amount spent.
    pub amount: Decimal,
    /// Expense account (default `GENERAL_EXPENSES`).
    pub expense_account: Option<AccountCode>,
    /// Account paid from (default `CASH`).
    pub paid_from: Option<AccountCode>,
    /// What the money was spent on.
    pub description: String,
    /// Caller-generated retry token.
    pub idempotency_key: Option<String>,
}

/// Request body for `POST /loans`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoanRequest {
    /// Loan principal received.
    pub amount: Decimal,
    /// Loan agreement reference.
    pub reference: Option<String>,
    /// Caller-generated retry token.
    pub idempotency_key: Option<String>,
}

/// Request body for `POST /loans/repayments`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoanRepaymentRequest {
    /// Principal repaid.
    pub principal: Decimal,
    /// Interest paid.
    #[serde(default)]
    pub interest: Decimal,
    /// Loan agreement reference.
    pub reference: Option<String>,
    /// Caller-generated retry token.
    pub idempotency_key: Option<String>,
}

/// Request body for `POST /material-issues`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MaterialIssueRequest {
    /// Cost of the issued materials.
    pub cost: Decimal,
    /// Work order receiving the materials.
    pub work_order: String,
    /// Caller-generated retry token.
    pub idempotency_key: Option<String>,
}

/// Request body for `POST /sales/completions`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaleRequest {
    /// Invoiced revenue.
    pub revenue: Decimal,
    /// Cost of the goods shipped.
    #[serde(default)]
    pub cost: Decimal,
    /// Invoice reference.
    pub invoice: String,
    /// Caller-generated retry token.
    pub idempotency_key: Option<String>,
}

/// Request body for the payment routes.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRequest {
    /// Amount paid.
    pub amount: Decimal,
    /// Invoice or bill reference.
    pub document: String,
    /// Caller-generated retry token.
    pub idempotency_key: Option<String>,
}

async fn submit(
    state: &AppState,
    built: Result<PostingRequest, LedgerError>,
    idempotency_key: Option<String>,
) -> Response {
    match built {
        Ok(mut request) => {
            request.idempotency_key = idempotency_key;
            post_and_respond(state, request).await
        }
        Err(e) => error_response(&e),
    }
}

fn standard(code: &'static str) -> AccountCode {
    AccountCode::from_static(code)
}

/// POST `/expenses` - Dr expense / Cr cash or payable.
async fn record_expense(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<ExpenseRequest>,
) -> Response {
    let built = postings::expense(
        payload.amount,
        payload
            .expense_account
            .unwrap_or_else(|| standard(codes::GENERAL_EXPENSES)),
        payload.paid_from.unwrap_or_else(|| standard(codes::CASH)),
        &payload.description,
    );
    submit(&state, built, payload.idempotency_key).await
}

/// POST `/loans` - Dr cash / Cr long-term debt.
async fn record_loan(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<LoanRequest>,
) -> Response {
    let built = postings::loan_received(
        payload.amount,
        standard(codes::CASH),
        standard(codes::LONG_TERM_DEBT),
    )
    .map(|request| match payload.reference {
        Some(reference) => request.with_linked_doc(reference),
        None => request,
    });
    submit(&state, built, payload.idempotency_key).await
}

/// POST `/loans/repayments` - Dr debt and interest / Cr cash.
async fn record_loan_repayment(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<LoanRepaymentRequest>,
) -> Response {
    let built = postings::loan_repayment(
        payload.principal,
        payload.interest,
        standard(codes::CASH),
        standard(codes::LONG_TERM_DEBT),
        standard(codes::INTEREST_EXPENSE),
    )
    .map(|request| match payload.reference {
        Some(reference) => request.with_linked_doc(reference),
        None => request,
    });
    submit(&state, built, payload.idempotency_key).await
}

/// POST `/material-issues` - Dr work in progress / Cr inventory.
async fn record_material_issue(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<MaterialIssueRequest>,
) -> Response {
    let built = postings::material_issue(payload.cost, &payload.work_order);
    submit(&state, built, payload.idempotency_key).await
}

/// POST `/sales/completions` - Revenue and cost of goods sold.
async fn record_sale(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<SaleRequest>,
) -> Response {
    let built = postings::sale_completed(payload.revenue, payload.cost, &payload.invoice);
    submit(&state, built, payload.idempotency_key).await
}

/// POST `/payments/received` - Dr cash / Cr receivables.
async fn record_payment_received(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<PaymentRequest>,
) -> Response {
    let built = postings::payment_received(payload.amount, &payload.document);
    submit(&state, built, payload.idempotency_key).await
}

/// POST `/payments/made` - Dr payables / Cr cash.
async fn record_payment_made(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<PaymentRequest>,
) -> Response {
    let built = postings::payment_made(payload.amount, &payload.document);
    submit(&state, built, payload.idempotency_key).await
}
