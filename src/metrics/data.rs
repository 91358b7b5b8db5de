/// Users stored column-wise: each field lives in its own contiguous array so a pass over one
/// field touches only that field's cache lines.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserData {
    pub ages: Vec<u8>,
    /// Payment amounts in cents.
    pub amounts: Vec<u32>,
}

impl UserData {
    pub fn new(ages: Vec<u8>, amounts: Vec<u32>) -> Self {
        Self { ages, amounts }
    }
}
