use super::*;

/// Allow-set of roles for one protected route group. Built once at wiring
/// time and consulted for every request that reaches the group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Roles(Vec<Role>);

impl Roles {
    pub fn new(roles: &[Role]) -> Self {
        Self(roles.to_vec())
    }
    /// Every role.
    pub fn any() -> Self {
        Self::new(&[Role::Admin, Role::Seller])
    }
    pub fn contains(&self, role: Role) -> bool {
        self.0.contains(&role)
    }
    /// Takes a [`Member`], which only the authentication gate hands out.
    pub fn permits(&self, member: &Member) -> Result<(), Error> {
        match self.contains(member.role()) {
            true => Ok(()),
            false => Err(Error::Forbidden(member.role())),
        }
    }
}
