use concordium_std::{
    num, LogError, ParseError, Reject, SchemaType, Serialize, TransferError, UnwrapAbort,
};

pub type SaleResult<A> = Result<A, SaleError>;

/// The different errors the sale contract can produce.
#[derive(Serialize, Debug, PartialEq, Eq, Reject, SchemaType)]
pub enum SaleError {
    #[from(ParseError)]
    ParseParams, //1
    LogFull,                     //
    LogMalformed,                //
    TransferFailed,              //
    Unauthorized,                //5
    InvalidState,                //
    InvalidParameters,           //
    AllocationTooSmall,          //
    AllocationTooLarge,          //
    SaleNotAcceptingAllocations, //10
    NotEligible,                 //
    CannotCloseYet,              //
}

impl From<LogError> for SaleError {
    #[inline(always)]
    fn from(le: LogError) -> Self {
        match le {
            LogError::Full => Self::LogFull,
            LogError::Malformed => Self::LogMalformed,
        }
    }
}

impl From<TransferError> for SaleError {
    #[inline(always)]
    fn from(_: TransferError) -> Self {
        Self::TransferFailed
    }
}
