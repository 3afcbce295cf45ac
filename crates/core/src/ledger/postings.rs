//! Builders for the postings raised by business operations.
//!
//! Each builder returns a request whose lines balance by construction.
//! Amounts must be strictly positive; anything else fails with `InvalidLine`.

use rust_decimal::Decimal;

use forgeline_shared::types::AccountCode;

use super::chart::codes;
use super::entry::JournalLine;
use super::error::LedgerError;
use super::types::PostingRequest;

fn account(code: &'static str) -> AccountCode {
    AccountCode::from_static(code)
}

/// Dr `expense_account` / Cr `paid_from` (cash or payable).
///
/// # Errors
///
/// Returns `InvalidLine` if `amount` is not positive.
pub fn expense(
    amount: Decimal,
    expense_account: AccountCode,
    paid_from: AccountCode,
    description: &str,
) -> Result<PostingRequest, LedgerError> {
    Ok(PostingRequest::new(vec![
        JournalLine::debit(expense_account, amount, description)?,
        JournalLine::credit(paid_from, amount, description)?,
    ])
    .with_description(description))
}

/// Dr `cash` / Cr `loan_account` for loan proceeds.
///
/// # Errors
///
/// Returns `InvalidLine` if `amount` is not positive.
pub fn loan_received(
    amount: Decimal,
    cash: AccountCode,
    loan_account: AccountCode,
) -> Result<PostingRequest, LedgerError> {
    Ok(PostingRequest::new(vec![
        JournalLine::debit(cash, amount, "Loan proceeds")?,
        JournalLine::credit(loan_account, amount, "Loan received")?,
    ])
    .with_description("Loan received"))
}

/// Dr loan (principal), Dr interest expense (when non-zero) / Cr cash.
///
/// # Errors
///
/// Returns `InvalidLine` if `principal` is not positive or `interest` is
/// negative, `AmountOverflow` if their sum exceeds the decimal range.
pub fn loan_repayment(
    principal: Decimal,
    interest: Decimal,
    cash: AccountCode,
    loan_account: AccountCode,
    interest_expense: AccountCode,
) -> Result<PostingRequest, LedgerError> {
    if interest < Decimal::ZERO {
        return Err(LedgerError::InvalidLine(format!(
            "interest on {loan_account} must not be negative, got {interest}"
        )));
    }

    let mut lines = vec![JournalLine::debit(loan_account, principal, "Loan principal")?];
    if interest > Decimal::ZERO {
        lines.push(JournalLine::debit(interest_expense, interest, "Loan interest")?);
    }
    let total = principal.checked_add(interest).ok_or_else(|| {
        LedgerError::AmountOverflow(format!(
            "repayment of {principal} plus interest {interest} exceeds {}",
            Decimal::MAX
        ))
    })?;
    lines.push(JournalLine::credit(cash, total, "Loan repayment")?);

    Ok(PostingRequest::new(lines).with_description("Loan repayment"))
}

/// Dr `WORK_IN_PROGRESS` / Cr `INVENTORY` for materials issued to a work order.
///
/// # Errors
///
/// Returns `InvalidLine` if `cost` is not positive.
pub fn material_issue(cost: Decimal, work_order: &str) -> Result<PostingRequest, LedgerError> {
    let description = format!("Materials issued to {work_order}");
    Ok(PostingRequest::new(vec![
        JournalLine::debit(account(codes::WORK_IN_PROGRESS), cost, description.as_str())?,
        JournalLine::credit(account(codes::INVENTORY), cost, description.as_str())?,
    ])
    .with_linked_doc(work_order)
    .with_description(description))
}

/// Dr `ACCOUNTS_RECEIVABLE` / Cr `SALES_REVENUE`, plus Dr
/// `COST_OF_GOODS_SOLD` / Cr `FINISHED_GOODS` when `cost` is non-zero.
///
/// # Errors
///
/// Returns `InvalidLine` if `revenue` is not positive or `cost` is negative.
pub fn sale_completed(
    revenue: Decimal,
    cost: Decimal,
    invoice: &str,
) -> Result<PostingRequest, LedgerError> {
    if cost < Decimal::ZERO {
        return Err(LedgerError::InvalidLine(format!(
            "cost of sale for {invoice} must not be negative, got {cost}"
        )));
    }

    let description = format!("Sale {invoice}");
    let mut lines = vec![
        JournalLine::debit(account(codes::ACCOUNTS_RECEIVABLE), revenue, description.as_str())?,
        JournalLine::credit(account(codes::SALES_REVENUE), revenue, description.as_str())?,
    ];
    if cost > Decimal::ZERO {
        lines.push(JournalLine::debit(account(codes::COST_OF_GOODS_SOLD), cost, "Cost of goods sold")?);
        lines.push(JournalLine::credit(account(codes::FINISHED_GOODS), cost, "Cost of goods sold")?);
    }

    Ok(PostingRequest::new(lines)
        .with_linked_doc(invoice)
        .with_description(description))
}

/// Dr `CASH` / Cr `ACCOUNTS_RECEIVABLE` for a customer payment.
///
/// # Errors
///
/// Returns `InvalidLine` if `amount` is not positive.
pub fn payment_received(amount: Decimal, invoice: &str) -> Result<PostingRequest, LedgerError> {
    let description = format!("Payment received for {invoice}");
    Ok(PostingRequest::new(vec![
        JournalLine::debit(account(codes::CASH), amount, description.as_str())?,
        JournalLine::credit(account(codes::ACCOUNTS_RECEIVABLE), amount, description.as_str())?,
    ])
    .with_linked_doc(invoice)
    .with_description(description))
}

/// Dr `ACCOUNTS_PAYABLE` / Cr `CASH` for a supplier payment.
///
/// # Errors
///
/// Returns `InvalidLine` if `amount` is not positive.
pub fn payment_made(amount: Decimal, bill: &str) -> Result<PostingRequest, LedgerError> {
    let description = format!("Payment made for {bill}");
    Ok(PostingRequest::new(vec![
        JournalLine::debit(account(codes::ACCOUNTS_PAYABLE), amount, description.as_str())?,
        JournalLine::credit(account(codes::CASH), amount, description.as_str())?,
    ])
    .with_linked_doc(bill)
    .with_description(description))
}
