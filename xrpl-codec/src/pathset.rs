//! `PathSet` (§3): a set of alternate payment paths, each a sequence of
//! steps naming an optional intermediate account, currency, and issuer.
//! Encoded as steps separated by nothing, paths separated by `0xFF`, the
//! whole set terminated by `0x00`.

use xrpl_hash::AccountId;

use crate::{
    currency::Currency,
    error::{DecodeError, EncodeError},
};

const TYPE_ACCOUNT: u8 = 0x01;
const TYPE_CURRENCY: u8 = 0x10;
const TYPE_ISSUER: u8 = 0x20;
const PATH_SEPARATOR: u8 = 0xFF;
const PATHSET_END: u8 = 0x00;

/// One step of a path: any subset of account / currency / issuer may be
/// present, signalled by a leading type byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PathStep {
    pub account: Option<AccountId>,
    pub currency: Option<Currency>,
    pub issuer: Option<AccountId>,
}

impl PathStep {
    fn type_byte(&self) -> u8 {
        let mut byte = 0;
        if self.account.is_some() {
            byte |= TYPE_ACCOUNT;
        }
        if self.currency.is_some() {
            byte |= TYPE_CURRENCY;
        }
        if self.issuer.is_some() {
            byte |= TYPE_ISSUER;
        }
        byte
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Path(pub Vec<PathStep>);

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PathSet(pub Vec<Path>);

impl PathSet {
    pub fn encode(&self, out: &mut Vec<u8>) -> Result<(), EncodeError> {
        for (i, path) in self.0.iter().enumerate() {
            if i > 0 {
                out.push(PATH_SEPARATOR);
            }
            for step in &path.0 {
                out.push(step.type_byte());
                if let Some(account) = step.account {
                    out.extend_from_slice(account.as_bytes());
                }
                if let Some(currency) = step.currency {
                    out.extend_from_slice(currency.as_hash().as_ref());
                }
                if let Some(issuer) = step.issuer {
                    out.extend_from_slice(issuer.as_bytes());
                }
            }
        }
        out.push(PATHSET_END);
        Ok(())
    }

    pub fn decode(input: &[u8]) -> Result<(Self, usize), DecodeError> {
        let mut paths = Vec::new();
        let mut steps = Vec::new();
        let mut pos = 0;

        loop {
            let type_byte = *input
                .get(pos)
                .ok_or(DecodeError::UnexpectedEof("path step type byte"))?;
            pos += 1;

            if type_byte == PATHSET_END {
                paths.push(Path(std::mem::take(&mut steps)));
                break;
            }
            if type_byte == PATH_SEPARATOR {
                paths.push(Path(std::mem::take(&mut steps)));
                continue;
            }
            if type_byte & !(TYPE_ACCOUNT | TYPE_CURRENCY | TYPE_ISSUER) != 0 {
                return Err(DecodeError::MalformedPathSet);
            }

            let mut step = PathStep::default();
            if type_byte & TYPE_ACCOUNT != 0 {
                let bytes: [u8; 20] = input
                    .get(pos..pos + 20)
                    .ok_or(DecodeError::UnexpectedEof("path step account"))?
                    .try_into()
                    .map_err(|_| DecodeError::MalformedPathSet)?;
                step.account = Some(AccountId::from_bytes(bytes));
                pos += 20;
            }
            if type_byte & TYPE_CURRENCY != 0 {
                let bytes: [u8; 20] = input
                    .get(pos..pos + 20)
                    .ok_or(DecodeError::UnexpectedEof("path step currency"))?
                    .try_into()
                    .map_err(|_| DecodeError::MalformedPathSet)?;
                step.currency = Some(Currency::from_bytes(bytes));
                pos += 20;
            }
            if type_byte & TYPE_ISSUER != 0 {
                let bytes: [u8; 20] = input
                    .get(pos..pos + 20)
                    .ok_or(DecodeError::UnexpectedEof("path step issuer"))?
                    .try_into()
                    .map_err(|_| DecodeError::MalformedPathSet)?;
                step.issuer = Some(AccountId::from_bytes(bytes));
                pos += 20;
            }
            steps.push(step);
        }

        Ok((PathSet(paths), pos))
    }
}
