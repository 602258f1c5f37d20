//! The vagabond role: a server outside the deployment.

use crate::server::ServerHandle;

use super::errors::RoleResult;

pub(crate) fn imbue(_server: &mut ServerHandle) -> RoleResult<()> {
    Ok(())
}

pub(crate) fn unimbue(_server: &mut ServerHandle) -> RoleResult<()> {
    Ok(())
}
