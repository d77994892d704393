//! Renders the tracker page: the status banner, the transaction form and the
//! transaction list.
//!
//! The whole tracker lives in one element (`#tracker`) so that every htmx
//! action can swap it out for a freshly rendered copy of the store's state.

use maud::{Markup, html};

use crate::{
    endpoints::{self, format_endpoint},
    html::{
        ALERT_ERROR_STYLE, ALERT_SUCCESS_STYLE, BUTTON_DELETE_STYLE, BUTTON_EDIT_STYLE,
        BUTTON_PRIMARY_STYLE, BUTTON_SECONDARY_STYLE, EXPENSE_AMOUNT_STYLE, EXPENSE_ROW_STYLE,
        FORM_TEXT_INPUT_STYLE, INCOME_AMOUNT_STYLE, INCOME_ROW_STYLE, PAGE_CONTAINER_STYLE, base,
        dollar_input_styles, loading_spinner,
    },
    tracker::{Mode, StatusMessage, TrackerState},
    transaction::{Draft, Transaction, TransactionType},
};

/// The CSS selector for the element that htmx requests swap.
pub const TRACKER_TARGET: &str = "#tracker";

/// The form controls htmx disables while the form's own request is in flight.
const IN_FLIGHT_DISABLED: &str = "find input, find select, find button";

/// The full HTML page for `state`.
pub fn tracker_page(state: &TrackerState) -> Markup {
    base("Transactions", &[dollar_input_styles()], &tracker_view(state))
}

/// The `#tracker` fragment for `state`.
pub fn tracker_view(state: &TrackerState) -> Markup {
    html! {
        main id="tracker" class=(PAGE_CONTAINER_STYLE)
        {
            h1 class="text-4xl font-bold text-center mb-8" { "Personal Finance Tracker" }

            @if let Some(message) = &state.message {
                (status_message_view(message))
            }

            (transaction_form_view(&state.draft, &state.mode, state.is_loading))

            (transaction_list_view(&state.transactions))
        }
    }
}

fn status_message_view(message: &StatusMessage) -> Markup {
    let (kind, style) = if message.is_error() {
        ("error", ALERT_ERROR_STYLE)
    } else {
        ("success", ALERT_SUCCESS_STYLE)
    };

    html! {
        div id="status-message" role="alert" data-kind=(kind) class=(style)
        {
            (message.text)
        }
    }
}

fn transaction_form_view(draft: &Draft, mode: &Mode, is_loading: bool) -> Markup {
    let is_editing = matches!(mode, Mode::Editing(_));
    let heading = if is_editing {
        "Edit Transaction"
    } else {
        "Add New Transaction"
    };
    let submit_label = if is_editing {
        "Update Transaction"
    } else {
        "Add Transaction"
    };
    let is_expense = draft.type_ == TransactionType::Expense;

    html! {
        section class="p-6 mb-8 rounded-lg shadow-inner bg-gray-50 dark:bg-gray-900"
        {
            h2 class="text-2xl font-semibold mb-4" { (heading) }

            form
                id="transaction-form"
                action=(endpoints::SUBMIT)
                method="post"
                hx-post=(endpoints::SUBMIT)
                hx-target=(TRACKER_TARGET)
                hx-swap="outerHTML"
                hx-disabled-elt=(IN_FLIGHT_DISABLED)
                hx-indicator="find button[type='submit']"
                class="grid grid-cols-1 md:grid-cols-2 lg:grid-cols-4 gap-4"
            {
                input
                    type="text"
                    name="description"
                    value=(draft.description)
                    placeholder="Description"
                    required
                    disabled[is_loading]
                    hx-post=(endpoints::DRAFT)
                    hx-trigger="change"
                    hx-swap="none"
                    class=(FORM_TEXT_INPUT_STYLE);

                div class="input-wrapper w-full"
                {
                    input
                        type="number"
                        name="amount"
                        value=(draft.amount)
                        placeholder="Amount"
                        step="0.01"
                        required
                        disabled[is_loading]
                        hx-post=(endpoints::DRAFT)
                        hx-trigger="change"
                        hx-swap="none"
                        class=(FORM_TEXT_INPUT_STYLE);
                }

                input
                    type="date"
                    name="date"
                    value=(draft.date)
                    required
                    disabled[is_loading]
                    hx-post=(endpoints::DRAFT)
                    hx-trigger="change"
                    hx-swap="none"
                    class=(FORM_TEXT_INPUT_STYLE);

                select
                    name="type"
                    disabled[is_loading]
                    hx-post=(endpoints::DRAFT)
                    hx-trigger="change"
                    hx-swap="none"
                    class=(FORM_TEXT_INPUT_STYLE)
                {
                    option value="income" selected[!is_expense] { "Income" }
                    option value="expense" selected[is_expense] { "Expense" }
                }

                div class="md:col-span-2 lg:col-span-4 flex gap-4"
                {
                    button type="submit" disabled[is_loading] class=(BUTTON_PRIMARY_STYLE)
                    {
                        @if is_loading {
                            (loading_spinner())
                            span class="submit-label" { "Processing..." }
                        } @else {
                            span class="submit-label" { (submit_label) }
                            span class="htmx-indicator" data-label="processing"
                            {
                                (loading_spinner())
                                "Processing..."
                            }
                        }
                    }

                    @if is_editing {
                        button
                            type="button"
                            hx-post=(endpoints::CANCEL_EDIT)
                            hx-target=(TRACKER_TARGET)
                            hx-swap="outerHTML"
                            disabled[is_loading]
                            class=(BUTTON_SECONDARY_STYLE)
                        {
                            "Cancel"
                        }
                    }
                }
            }
        }
    }
}

/// The amount with a sign and currency symbol derived from the transaction
/// type, e.g. "-$4.50" for an expense.
fn signed_amount(transaction: &Transaction) -> String {
    let sign = match transaction.type_ {
        TransactionType::Income => "+",
        TransactionType::Expense => "-",
    };

    format!("{sign}${}", transaction.amount.magnitude())
}

fn transaction_list_view(transactions: &[Transaction]) -> Markup {
    let row = |transaction: &Transaction| {
        let (row_style, amount_style) = match transaction.type_ {
            TransactionType::Income => (INCOME_ROW_STYLE, INCOME_AMOUNT_STYLE),
            TransactionType::Expense => (EXPENSE_ROW_STYLE, EXPENSE_AMOUNT_STYLE),
        };
        let edit_url = format_endpoint(endpoints::EDIT_TRANSACTION, &transaction.id);
        let delete_url = format_endpoint(endpoints::DELETE_TRANSACTION, &transaction.id);

        html! {
            li
                data-transaction-id=(transaction.id)
                data-transaction-type=(transaction.type_)
                class=(row_style)
            {
                div class="flex-1"
                {
                    div class="font-bold text-lg" data-field="description" { (transaction.description) }
                    div class="text-gray-600 dark:text-gray-400 text-sm" data-field="date" { (transaction.date) }
                }

                div class="text-xl font-bold flex items-center"
                {
                    span class=(amount_style) data-field="amount" { (signed_amount(transaction)) }

                    div class="ml-4 flex gap-2 text-sm"
                    {
                        button
                            type="button"
                            hx-post=(edit_url)
                            hx-target=(TRACKER_TARGET)
                            hx-swap="outerHTML"
                            class=(BUTTON_EDIT_STYLE)
                        {
                            "Edit"
                        }

                        button
                            type="button"
                            hx-delete=(delete_url)
                            hx-target=(TRACKER_TARGET)
                            hx-swap="outerHTML"
                            class=(BUTTON_DELETE_STYLE)
                        {
                            "Delete"
                        }
                    }
                }
            }
        }
    };

    html! {
        section class="p-6 rounded-lg shadow-inner"
        {
            h2 class="text-2xl font-semibold mb-4" { "Recent Transactions" }

            @if transactions.is_empty() {
                p class="text-center text-gray-500 dark:text-gray-400" { "No transactions yet." }
            } @else {
                ul id="transaction-list" class="space-y-4"
                {
                    @for transaction in transactions {
                        (row(transaction))
                    }
                }
            }
        }
    }
}
