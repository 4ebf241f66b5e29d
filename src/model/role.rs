#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Role {
    Admin = 1,
    Coordinator = 2,
    Student = 3,
    Supervisor = 4,
    Employer = 5,
}

impl Role {
    pub fn from_id(id: u8) -> Option<Self> {
        match id {
            1 => Some(Role::Admin),
            2 => Some(Role::Coordinator),
            3 => Some(Role::Student),
            4 => Some(Role::Supervisor),
            5 => Some(Role::Employer),
            _ => None,
        }
    }
}
