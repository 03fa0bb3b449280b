use std::fmt;

pub const ARCHITECT: &str = "Architect";
pub const CONTRACTOR: &str = "Contractor";
pub const CUSTOMER: &str = "Customer";

/// One person attached to a project. Each party is owned by exactly one
/// project slot; two parties with the same details are still distinct.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Party {
    /// Role on the project, usually one of the role constants but free text is allowed
    pub role: String,
    /// Full name
    pub name: String,
    /// Phone number
    pub phone_number: String,
    /// Email address
    pub email_address: String,
    /// Postal address
    pub postal_address: String,
}

impl Party {
    pub fn new(
        role: impl Into<String>,
        name: impl Into<String>,
        phone_number: impl Into<String>,
        email_address: impl Into<String>,
        postal_address: impl Into<String>,
    ) -> Self {
        Self {
            role: role.into(),
            name: name.into(),
            phone_number: phone_number.into(),
            email_address: email_address.into(),
            postal_address: postal_address.into(),
        }
    }

    /// Replace the contact details, leaving role and name untouched.
    pub fn update_contact(&mut self, contact: ContactDetails) {
        self.phone_number = contact.phone_number;
        self.email_address = contact.email_address;
        self.postal_address = contact.postal_address;
    }
}

pub struct ContactDetails {
    pub phone_number: String,
    pub email_address: String,
    pub postal_address: String,
}

impl fmt::Display for Party {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.role)?;
        writeln!(f, "Name:            {}", self.name)?;
        writeln!(f, "Phone number:    {}", self.phone_number)?;
        writeln!(f, "Email address:   {}", self.email_address)?;
        write!(f, "Address:         {}", self.postal_address)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_contact_keeps_role_and_name() {
        let mut party = Party::new(CONTRACTOR, "Bob Builder", "011 555 0101", "bob@build.co.za", "1 Site Rd");

        party.update_contact(ContactDetails {
            phone_number: String::from("021 555 0199"),
            email_address: String::from("bob@newbuild.co.za"),
            postal_address: String::from("9 Depot St"),
        });

        assert_eq!(party.role, CONTRACTOR);
        assert_eq!(party.name, "Bob Builder");
        assert_eq!(party.phone_number, "021 555 0199");
        assert_eq!(party.email_address, "bob@newbuild.co.za");
        assert_eq!(party.postal_address, "9 Depot St");
    }

    #[test]
    fn test_display_renders_contact_block() {
        let party = Party::new(CUSTOMER, "Ann Smith", "082 000 1111", "ann@mail.com", "4 Oak Ave");

        let rendered = party.to_string();

        assert_eq!(
            rendered,
            "Customer\n\
             Name:            Ann Smith\n\
             Phone number:    082 000 1111\n\
             Email address:   ann@mail.com\n\
             Address:         4 Oak Ave"
        );
    }
}
