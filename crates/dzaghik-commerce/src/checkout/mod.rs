//! Checkout module.
//!
//! Contains the checkout form, the orchestrator, the order payload and the
//! payment seams.

mod flow;
mod form;
mod order;
mod payment;

pub use flow::{
    Checkout, CheckoutError, CheckoutPhase, CheckoutServices, CheckoutSource, CheckoutSuccess,
    DEFAULT_REDIRECT_DELAY,
};
pub use form::{CheckoutForm, FormField, DEFAULT_CITY};
pub use order::{
    OrderConfirmation, OrderItem, OrderStatus, OrderSubmission, PaymentMethod, PaymentStatus,
};
pub use payment::{
    BackendError, BillingDetails, CardDetails, ConfirmedPayment, OrderSink, PaymentError,
    PaymentIntent, PaymentIntents, PaymentProcessor,
};
