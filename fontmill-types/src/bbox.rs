use crate::Point;

/// Minimum and maximum extents of a rectangular region.
#[derive(Copy, Clone, PartialEq, Eq, Default, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BoundingBox<T> {
    /// Minimum extent in the x direction-- the left side of a region.
    pub x_min: T,
    /// Minimum extent in the y direction. In a Y-up coordinate system,
    /// which is used by fonts, this represents the bottom of a region.
    pub y_min: T,
    /// Maximum extent in the x direction-- the right side of a region.
    pub x_max: T,
    /// Maximum extent in the y direction.
    pub y_max: T,
}

impl<T: PartialOrd + Copy> BoundingBox<T> {
    /// Computes the bounds of a sequence of points.
    ///
    /// Returns `None` if the sequence is empty.
    pub fn from_points(points: impl IntoIterator<Item = Point<T>>) -> Option<Self> {
        let mut points = points.into_iter();
        let first = points.next()?;
        let mut bbox = BoundingBox {
            x_min: first.x,
            y_min: first.y,
            x_max: first.x,
            y_max: first.y,
        };
        for point in points {
            bbox.add(point);
        }
        Some(bbox)
    }

    /// Extend the region to include `point`.
    pub fn add(&mut self, point: Point<T>) {
        if point.x < self.x_min {
            self.x_min = point.x;
        }
        if point.x > self.x_max {
            self.x_max = point.x;
        }
        if point.y < self.y_min {
            self.y_min = point.y;
        }
        if point.y > self.y_max {
            self.y_max = point.y;
        }
    }

    /// Returns the union of two regions.
    pub fn union(self, other: Self) -> Self {
        let mut out = self;
        out.add(Point::new(other.x_min, other.y_min));
        out.add(Point::new(other.x_max, other.y_max));
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bounds_of_points() {
        let bbox = BoundingBox::from_points([
            Point::new(10, -5),
            Point::new(-3, 20),
            Point::new(7, 7),
        ])
        .unwrap();
        assert_eq!(
            bbox,
            BoundingBox {
                x_min: -3,
                y_min: -5,
                x_max: 10,
                y_max: 20
            }
        );
        assert!(BoundingBox::<i32>::from_points([]).is_none());
    }

    #[test]
    fn union() {
        let a = BoundingBox {
            x_min: 0,
            y_min: 0,
            x_max: 10,
            y_max: 10,
        };
        let b = BoundingBox {
            x_min: -5,
            y_min: 2,
            x_max: 3,
            y_max: 40,
        };
        assert_eq!(
            a.union(b),
            BoundingBox {
                x_min: -5,
                y_min: 0,
                x_max: 10,
                y_max: 40
            }
        );
    }
}
