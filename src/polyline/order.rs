/// Order tags of duplicated polyline vertices.
use crate::error::RenderError;

/// Which ribbon edge a duplicated vertex sits on (the sign) and which
/// neighbour it pairs with (the magnitude): `±1` vertices close the segment
/// coming from `prev`, `±2` vertices open the segment towards `next`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Order {
    Minus2,
    Minus1,
    Plus1,
    Plus2,
}

impl Order {
    /// Emission order of the four duplicates of one point.
    pub const EMISSION: [Order; 4] = [Order::Plus1, Order::Minus1, Order::Plus2, Order::Minus2];

    #[inline]
    pub const fn value(self) -> i32 {
        match self {
            Order::Minus2 => -2,
            Order::Minus1 => -1,
            Order::Plus1 => 1,
            Order::Plus2 => 2,
        }
    }

    /// Value of the `order` attribute.
    #[inline]
    pub fn as_f32(self) -> f32 {
        self.value() as f32
    }

    /// Ribbon edge: `1.0` or `-1.0`.
    #[inline]
    pub fn side(self) -> f32 {
        if self.value() > 0 {
            1.0
        } else {
            -1.0
        }
    }

    /// `±1`: the near-plane clip walks towards `prev`.
    #[inline]
    pub fn pairs_with_prev(self) -> bool {
        self.value().abs() == 1
    }
}

impl TryFrom<i32> for Order {
    type Error = RenderError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        match value {
            -2 => Ok(Order::Minus2),
            -1 => Ok(Order::Minus1),
            1 => Ok(Order::Plus1),
            2 => Ok(Order::Plus2),
            other => Err(RenderError::InvalidOrder(other)),
        }
    }
}

impl From<Order> for i32 {
    fn from(order: Order) -> i32 {
        order.value()
    }
}
