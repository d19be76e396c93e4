//! # Contract ABI
//!
//! Encoding and decoding of [`ContractCall`]s with `ethers::abi`.
//!
//! Every [`ContractFunction`] declares a human-readable signature; they are
//! parsed once into a single [`Abi`] when the client is built.

use super::client::{ChainError, ChainResult};
use crate::domain::value_objects::contract_call::{
    CallArg, ChainValue, ContractCall, ContractFunction,
};
use ethers::abi::{Abi, Function, Token, parse_abi};
use ethers::types::{Address, Bytes};

/// Parsed ABI of every function the client calls.
#[derive(Debug, Clone)]
pub struct ContractAbi {
    abi: Abi,
}

impl ContractAbi {
    /// Parses the signatures of all known functions.
    ///
    /// # Errors
    ///
    /// Returns an error if a signature does not parse.
    pub fn load() -> ChainResult<Self> {
        let signatures: Vec<&str> = ContractFunction::ALL
            .iter()
            .map(ContractFunction::signature)
            .collect();
        let abi = parse_abi(&signatures)
            .map_err(|e| ChainError::invalid_input(format!("abi: {}", e)))?;
        Ok(Self { abi })
    }

    fn function(&self, function: ContractFunction) -> ChainResult<&Function> {
        self.abi
            .function(function.name())
            .map_err(|e| ChainError::invalid_input(format!("{}: {}", function, e)))
    }

    /// Encodes a call into calldata.
    ///
    /// # Errors
    ///
    /// Returns an error if an address argument is malformed or the arguments
    /// do not match the function's inputs.
    pub fn encode(&self, call: &ContractCall) -> ChainResult<Bytes> {
        let function = self.function(call.function)?;
        let tokens = call
            .args
            .iter()
            .map(to_token)
            .collect::<ChainResult<Vec<_>>>()?;
        function
            .encode_input(&tokens)
            .map(Bytes::from)
            .map_err(|e| ChainError::invalid_input(format!("{}: {}", call.function, e)))
    }

    /// Decodes the single return value of a view call.
    ///
    /// # Errors
    ///
    /// Returns an error if the output does not match the declared return type.
    pub fn decode(&self, function: ContractFunction, output: &[u8]) -> ChainResult<ChainValue> {
        let tokens = self
            .function(function)?
            .decode_output(output)
            .map_err(|e| ChainError::invalid_response(format!("{}: {}", function, e)))?;

        match tokens.into_iter().next() {
            Some(Token::Uint(value)) => Ok(ChainValue::Uint(value)),
            Some(Token::Bool(flag)) => Ok(ChainValue::Bool(flag)),
            Some(other) => Err(ChainError::invalid_response(format!(
                "{}: unexpected return {:?}",
                function, other
            ))),
            None => Err(ChainError::invalid_response(format!(
                "{}: empty return",
                function
            ))),
        }
    }
}

/// Parses a hex address.
///
/// # Errors
///
/// Returns an error if the string is not a 20-byte hex address.
pub fn parse_address(raw: &str) -> ChainResult<Address> {
    raw.trim()
        .parse()
        .map_err(|_| ChainError::invalid_input(format!("invalid address: {}", raw)))
}

fn to_token(arg: &CallArg) -> ChainResult<Token> {
    match arg {
        CallArg::Address(raw) => parse_address(raw).map(Token::Address),
        CallArg::Uint(value) => Ok(Token::Uint(*value)),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
#[allow(clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::domain::value_objects::address::ContractAddress;
    use ethers::types::U256;

    const TOKEN: &str = "0x00000000000000000000000000000000000000aa";
    const ACCOUNT: &str = "0x00000000000000000000000000000000000000a1";

    #[test]
    fn all_signatures_parse() {
        let abi = ContractAbi::load().unwrap();
        for function in ContractFunction::ALL {
            assert!(abi.function(function).is_ok(), "{}", function);
        }
    }

    #[test]
    fn encodes_balance_of() {
        let abi = ContractAbi::load().unwrap();
        let call = ContractCall::new(
            ContractAddress::new(TOKEN).unwrap(),
            ContractFunction::BalanceOf,
        )
        .address_arg(ACCOUNT);

        let data = abi.encode(&call).unwrap();
        assert_eq!(&data[..4], &[0x70, 0xa0, 0x82, 0x31]);
        assert_eq!(data.len(), 36);
        assert_eq!(data[35], 0xa1);
    }

    #[test]
    fn rejects_malformed_address_argument() {
        let abi = ContractAbi::load().unwrap();
        let call = ContractCall::new(
            ContractAddress::new(TOKEN).unwrap(),
            ContractFunction::HasClaimed,
        )
        .address_arg("not-an-address");

        assert!(matches!(
            abi.encode(&call),
            Err(ChainError::InvalidInput(_))
        ));
    }

    #[test]
    fn rejects_wrong_arity() {
        let abi = ContractAbi::load().unwrap();
        let call = ContractCall::new(
            ContractAddress::new(TOKEN).unwrap(),
            ContractFunction::Approve,
        )
        .uint_arg(U256::one());
        assert!(abi.encode(&call).is_err());
    }

    #[test]
    fn decodes_uint_and_bool() {
        let abi = ContractAbi::load().unwrap();

        let mut word = [0u8; 32];
        word[31] = 1;
        assert_eq!(
            abi.decode(ContractFunction::HasClaimed, &word).unwrap(),
            ChainValue::Bool(true)
        );

        word[30] = 0x01;
        word[31] = 0xf4;
        assert_eq!(
            abi.decode(ContractFunction::TotalAssets, &word).unwrap(),
            ChainValue::Uint(U256::from(500u64))
        );
    }

    #[test]
    fn short_output_is_invalid_response() {
        let abi = ContractAbi::load().unwrap();
        assert!(matches!(
            abi.decode(ContractFunction::BalanceOf, &[0u8; 4]),
            Err(ChainError::InvalidResponse(_))
        ));
    }
}
