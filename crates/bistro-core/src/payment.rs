//! Payment methods offered by the client bill flow.
//!
//! Payment itself is a client-confirmed no-op: the engine records the
//! method and amount and moves the table to PAGADA.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum PaymentMethod {
    /// Mercado Pago transfer to the house alias.
    TransferenciaMp,
    /// Bank transfer to the house alias.
    TransferenciaBancaria,
    /// Online card payment link.
    TarjetaOnline,
    /// Cash at the table.
    Efectivo,
    /// Card on the waiter's terminal.
    TarjetaFisica,
    /// In-store QR.
    QrLocal,
}

impl PaymentMethod {
    /// Label shown on the picker and the ticket.
    pub fn label(&self) -> &'static str {
        match self {
            PaymentMethod::TransferenciaMp => "Transferencia MP",
            PaymentMethod::TransferenciaBancaria => "Transferencia Bancaria",
            PaymentMethod::TarjetaOnline => "Tarjeta Online",
            PaymentMethod::Efectivo => "Efectivo",
            PaymentMethod::TarjetaFisica => "Tarjeta Física",
            PaymentMethod::QrLocal => "QR Local",
        }
    }

    /// Methods settled without a waiter at the table.
    pub fn is_online(&self) -> bool {
        matches!(
            self,
            PaymentMethod::TransferenciaMp
                | PaymentMethod::TransferenciaBancaria
                | PaymentMethod::TarjetaOnline
        )
    }
}

impl std::fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}
