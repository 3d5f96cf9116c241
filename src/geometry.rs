//! Geometric utility objects.

use crate::num::BFloat;
use num;
use std::{
    fmt,
    ops::{Add, Div, Index, IndexMut, Mul, Neg, Sub},
};

#[cfg(feature = "serialization")]
use serde::Serialize;

#[cfg(any(test, feature = "for-testing"))]
use approx::{AbsDiffEq, RelativeEq};

/// Denotes the x-, y- or z-dimension.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Dim3 {
    X = 0,
    Y = 1,
    Z = 2,
}

impl Dim3 {
    /// Creates an array for iterating over the x-, y- and z-dimensions.
    pub fn slice() -> [Self; 3] {
        [Self::X, Self::Y, Self::Z]
    }

    /// Returns the number of the dimension.
    pub fn num(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Dim3 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Self::X => "x",
                Self::Y => "y",
                Self::Z => "z",
            }
        )
    }
}

use Dim3::{X, Y, Z};

/// Represents any quantity with three dimensional components.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serialization", derive(Serialize))]
pub struct In3D<T>([T; 3]);

impl<T> In3D<T> {
    /// Creates a new 3D quantity given the three components.
    pub fn new(x: T, y: T, z: T) -> Self {
        Self([x, y, z])
    }

    /// Creates a new 3D quantity by evaluating the given component
    /// constructor for each dimension.
    pub fn with_each_component<C>(create_component: C) -> Self
    where
        C: Fn(Dim3) -> T,
    {
        Self::new(
            create_component(X),
            create_component(Y),
            create_component(Z),
        )
    }

    /// Creates a new 3D quantity with the given value copied into all components.
    pub fn same(a: T) -> Self
    where
        T: Copy,
    {
        Self([a, a, a])
    }

    /// Creates a new tuple containing copies of the three components.
    pub fn to_tuple(&self) -> (T, T, T)
    where
        T: Copy,
    {
        (self[X], self[Y], self[Z])
    }
}

impl<T> Index<Dim3> for In3D<T> {
    type Output = T;
    fn index(&self, dim: Dim3) -> &Self::Output {
        &self.0[dim as usize]
    }
}

impl<T> IndexMut<Dim3> for In3D<T> {
    fn index_mut(&mut self, dim: Dim3) -> &mut Self::Output {
        &mut self.0[dim as usize]
    }
}

impl<'a, T> IntoIterator for &'a In3D<T> {
    type Item = &'a T;
    type IntoIter = ::std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl<T: fmt::Display> fmt::Display for In3D<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}, {}]", self[X], self[Y], self[Z])
    }
}

#[cfg(any(test, feature = "for-testing"))]
impl<T> AbsDiffEq for In3D<T>
where
    T: AbsDiffEq,
    T::Epsilon: Copy,
{
    type Epsilon = <T as AbsDiffEq>::Epsilon;

    fn default_epsilon() -> Self::Epsilon {
        T::default_epsilon()
    }

    fn abs_diff_eq(&self, other: &Self, epsilon: Self::Epsilon) -> bool {
        Dim3::slice()
            .iter()
            .all(|&dim| T::abs_diff_eq(&self[dim], &other[dim], epsilon))
    }
}

#[cfg(any(test, feature = "for-testing"))]
impl<T> RelativeEq for In3D<T>
where
    T: RelativeEq,
    T::Epsilon: Copy,
{
    fn default_max_relative() -> Self::Epsilon {
        T::default_max_relative()
    }

    fn relative_eq(
        &self,
        other: &Self,
        epsilon: Self::Epsilon,
        max_relative: Self::Epsilon,
    ) -> bool {
        Dim3::slice()
            .iter()
            .all(|&dim| T::relative_eq(&self[dim], &other[dim], epsilon, max_relative))
    }
}

#[cfg(any(test, feature = "for-testing"))]
macro_rules! impl_approx_eq_3d {
    ($T:ident <$F:ident>) => {
        impl<$F> AbsDiffEq for $T<$F>
        where
            $F: BFloat + AbsDiffEq,
            $F::Epsilon: Copy,
        {
            type Epsilon = <In3D<$F> as AbsDiffEq>::Epsilon;

            fn default_epsilon() -> Self::Epsilon {
                In3D::<$F>::default_epsilon()
            }

            fn abs_diff_eq(&self, other: &Self, epsilon: Self::Epsilon) -> bool {
                In3D::<$F>::abs_diff_eq(&self.0, &other.0, epsilon)
            }
        }

        impl<$F> RelativeEq for $T<$F>
        where
            $F: BFloat + RelativeEq,
            $F::Epsilon: Copy,
        {
            fn default_max_relative() -> Self::Epsilon {
                In3D::<$F>::default_max_relative()
            }

            fn relative_eq(
                &self,
                other: &Self,
                epsilon: Self::Epsilon,
                max_relative: Self::Epsilon,
            ) -> bool {
                In3D::<$F>::relative_eq(&self.0, &other.0, epsilon, max_relative)
            }
        }
    };
}

macro_rules! impl_index_3d {
    ($T:ident <$F:ident: $B:ident>) => {
        impl<$F: $B> Index<Dim3> for $T<$F> {
            type Output = $F;
            fn index(&self, dim: Dim3) -> &Self::Output {
                &self.0[dim]
            }
        }

        impl<$F: $B> IndexMut<Dim3> for $T<$F> {
            fn index_mut(&mut self, dim: Dim3) -> &mut Self::Output {
                &mut self.0[dim]
            }
        }
    };
}

/// A 3D vector.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serialization", derive(Serialize))]
pub struct Vec3<F>(In3D<F>);

impl<F: BFloat> Vec3<F> {
    /// Creates a new 3D vector given the three components.
    pub fn new(x: F, y: F, z: F) -> Self {
        Self(In3D::new(x, y, z))
    }

    /// Creates a new 3D vector by evaluating the given component
    /// constructor for each dimension.
    pub fn with_each_component<C>(create_component: C) -> Self
    where
        C: Fn(Dim3) -> F,
    {
        Self(In3D::with_each_component(create_component))
    }

    /// Creates a new zero vector.
    pub fn zero() -> Self {
        Self::equal_components(F::zero())
    }

    /// Creates a new vector with all component equal to the given value.
    pub fn equal_components(a: F) -> Self {
        Self::new(a, a, a)
    }

    /// Constructs a new point from the vector components.
    pub fn to_point3(&self) -> Point3<F> {
        Point3::with_each_component(|dim| self[dim])
    }

    /// Computes the component-wise product with the given vector.
    pub fn component_mul(&self, other: &Self) -> Self {
        Self::with_each_component(|dim| self[dim] * other[dim])
    }

    /// Computes the component-wise reciprocal of the vector.
    pub fn recip(&self) -> Self {
        Self::with_each_component(|dim| self[dim].recip())
    }

    /// Computes the squared length of the vector.
    pub fn squared_length(&self) -> F {
        self.dot(self)
    }

    /// Computes the length of the vector.
    pub fn length(&self) -> F {
        self.squared_length().sqrt()
    }

    /// Computes the dot product of the vector with another vector.
    pub fn dot(&self, other: &Self) -> F {
        self[X] * other[X] + self[Y] * other[Y] + self[Z] * other[Z]
    }

    /// Computes the cross product of the vector with another vector.
    pub fn cross(&self, other: &Self) -> Self {
        Self::new(
            self[Y] * other[Z] - self[Z] * other[Y],
            self[Z] * other[X] - self[X] * other[Z],
            self[X] * other[Y] - self[Y] * other[X],
        )
    }

    /// Returns a unit length copy of the vector, or the zero vector if the
    /// vector has zero length.
    pub fn normalized(&self) -> Self {
        let length = self.length();
        if length == F::zero() {
            Self::zero()
        } else {
            self / length
        }
    }

    /// Determines the maximum component value for the vector.
    pub fn max(&self) -> F {
        F::max(self[X], F::max(self[Y], self[Z]))
    }

    /// Determines the minimum component value for the vector.
    pub fn min(&self) -> F {
        F::min(self[X], F::min(self[Y], self[Z]))
    }

    /// Computes the product of the three components.
    pub fn product(&self) -> F {
        self[X] * self[Y] * self[Z]
    }
}

impl_index_3d!(Vec3<F: BFloat>);

impl<F: BFloat> Add<&Vec3<F>> for &Vec3<F> {
    type Output = Vec3<F>;
    fn add(self, other: &Vec3<F>) -> Self::Output {
        Vec3::with_each_component(|dim| self[dim] + other[dim])
    }
}

impl<F: BFloat> Add<Vec3<F>> for Vec3<F> {
    type Output = Self;
    fn add(self, other: Self) -> Self::Output {
        &self + &other
    }
}

impl<F: BFloat> Sub<&Vec3<F>> for &Vec3<F> {
    type Output = Vec3<F>;
    fn sub(self, other: &Vec3<F>) -> Self::Output {
        Vec3::with_each_component(|dim| self[dim] - other[dim])
    }
}

impl<F: BFloat> Sub<Vec3<F>> for Vec3<F> {
    type Output = Self;
    fn sub(self, other: Self) -> Self::Output {
        &self - &other
    }
}

impl<F: BFloat> Mul<F> for &Vec3<F> {
    type Output = Vec3<F>;
    fn mul(self, factor: F) -> Self::Output {
        Vec3::with_each_component(|dim| factor * self[dim])
    }
}

impl<F: BFloat> Mul<F> for Vec3<F> {
    type Output = Self;
    fn mul(self, factor: F) -> Self::Output {
        &self * factor
    }
}

impl<F: BFloat> Div<F> for &Vec3<F> {
    type Output = Vec3<F>;
    fn div(self, divisor: F) -> Self::Output {
        #![allow(clippy::suspicious_arithmetic_impl)]
        self * divisor.recip()
    }
}

impl<F: BFloat> Div<F> for Vec3<F> {
    type Output = Self;
    fn div(self, divisor: F) -> Self::Output {
        &self / divisor
    }
}

impl<F: BFloat> Neg for Vec3<F> {
    type Output = Self;
    fn neg(self) -> Self::Output {
        Self::with_each_component(|dim| -self[dim])
    }
}

impl<'a, F: BFloat> IntoIterator for &'a Vec3<F> {
    type Item = <&'a In3D<F> as IntoIterator>::Item;
    type IntoIter = <&'a In3D<F> as IntoIterator>::IntoIter;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<F: BFloat> fmt::Display for Vec3<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self[X], self[Y], self[Z])
    }
}

#[cfg(any(test, feature = "for-testing"))]
impl_approx_eq_3d!(Vec3<F>);

/// A 3D spatial coordinate.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serialization", derive(Serialize))]
pub struct Point3<F>(In3D<F>);

impl<F: BFloat> Point3<F> {
    /// Creates a new 3D point given the three components.
    pub fn new(x: F, y: F, z: F) -> Self {
        Self(In3D::new(x, y, z))
    }

    /// Creates a new 3D point by evaluating the given component
    /// constructor for each dimension.
    pub fn with_each_component<C>(create_component: C) -> Self
    where
        C: Fn(Dim3) -> F,
    {
        Self(In3D::with_each_component(create_component))
    }

    /// Creates a new 3D point with all components set to zero.
    pub fn origin() -> Self {
        Self::equal_components(F::zero())
    }

    /// Creates a new point with all component equal to the given value.
    pub fn equal_components(a: F) -> Self {
        Self::new(a, a, a)
    }

    /// Constructs a new vector from the point components.
    pub fn to_vec3(&self) -> Vec3<F> {
        Vec3::with_each_component(|dim| self[dim])
    }

    /// Constructs a new point by taking the component-wise min with the given point.
    pub fn min_with(&self, other: &Self) -> Self {
        Self::with_each_component(|dim| F::min(self[dim], other[dim]))
    }

    /// Constructs a new point by taking the component-wise max with the given point.
    pub fn max_with(&self, other: &Self) -> Self {
        Self::with_each_component(|dim| F::max(self[dim], other[dim]))
    }
}

impl_index_3d!(Point3<F: BFloat>);

impl<F: BFloat> Sub<&Point3<F>> for &Point3<F> {
    type Output = Vec3<F>;
    fn sub(self, other: &Point3<F>) -> Self::Output {
        Vec3::with_each_component(|dim| self[dim] - other[dim])
    }
}

impl<F: BFloat> Sub<Point3<F>> for Point3<F> {
    type Output = Vec3<F>;
    fn sub(self, other: Self) -> Self::Output {
        &self - &other
    }
}

impl<F: BFloat> Add<&Vec3<F>> for &Point3<F> {
    type Output = Point3<F>;
    fn add(self, vector: &Vec3<F>) -> Self::Output {
        Point3::with_each_component(|dim| self[dim] + vector[dim])
    }
}

impl<F: BFloat> Add<Vec3<F>> for Point3<F> {
    type Output = Self;
    fn add(self, vector: Vec3<F>) -> Self::Output {
        &self + &vector
    }
}

impl<F: BFloat> Sub<&Vec3<F>> for &Point3<F> {
    type Output = Point3<F>;
    fn sub(self, vector: &Vec3<F>) -> Self::Output {
        Point3::with_each_component(|dim| self[dim] - vector[dim])
    }
}

impl<F: BFloat> Sub<Vec3<F>> for Point3<F> {
    type Output = Self;
    fn sub(self, vector: Vec3<F>) -> Self::Output {
        &self - &vector
    }
}

impl<'a, F: BFloat> IntoIterator for &'a Point3<F> {
    type Item = <&'a In3D<F> as IntoIterator>::Item;
    type IntoIter = <&'a In3D<F> as IntoIterator>::IntoIter;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<F: BFloat> fmt::Display for Point3<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self[X], self[Y], self[Z])
    }
}

#[cfg(any(test, feature = "for-testing"))]
impl_approx_eq_3d!(Point3<F>);

/// A 3D index.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serialization", derive(Serialize))]
pub struct Idx3<I>(In3D<I>);

impl<I: num::Integer + Copy> Idx3<I> {
    /// Creates a new 3D index given the three components.
    pub fn new(i: I, j: I, k: I) -> Self {
        Self(In3D::new(i, j, k))
    }

    /// Creates a new 3D index by evaluating the given component
    /// constructor for each dimension.
    pub fn with_each_component<C>(create_component: C) -> Self
    where
        C: Fn(Dim3) -> I,
    {
        Self(In3D::with_each_component(create_component))
    }
}

impl<I: num::Integer> Index<Dim3> for Idx3<I> {
    type Output = I;
    fn index(&self, dim: Dim3) -> &Self::Output {
        &self.0[dim]
    }
}

impl<I: num::Integer> IndexMut<Dim3> for Idx3<I> {
    fn index_mut(&mut self, dim: Dim3) -> &mut Self::Output {
        &mut self.0[dim]
    }
}

impl<I: num::Integer + fmt::Display> fmt::Display for Idx3<I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}, {}]", self[X], self[Y], self[Z])
    }
}

/// An axis-aligned box in 3D space.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serialization", derive(Serialize))]
pub struct BoundingBox3<F> {
    lower: Point3<F>,
    upper: Point3<F>,
}

impl<F: BFloat> BoundingBox3<F> {
    /// Creates a new box given its lower and upper corners.
    ///
    /// # Panics
    ///
    /// If any component of the upper corner is smaller than the
    /// corresponding component of the lower corner.
    pub fn new(lower: Point3<F>, upper: Point3<F>) -> Self {
        for &dim in &Dim3::slice() {
            assert!(
                upper[dim] >= lower[dim],
                "Upper bound must not be smaller than lower bound"
            );
        }
        Self { lower, upper }
    }

    /// Creates the smallest box containing all the given points,
    /// or `None` if there are no points.
    pub fn enclosing<'a, I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = &'a Point3<F>>,
        F: 'a,
    {
        let mut points = points.into_iter();
        let first = *points.next()?;
        let (lower, upper) = points.fold((first, first), |(lower, upper), point| {
            (lower.min_with(point), upper.max_with(point))
        });
        Some(Self { lower, upper })
    }

    /// Returns a reference to the lower corner of the box.
    pub fn lower(&self) -> &Point3<F> {
        &self.lower
    }

    /// Returns a reference to the upper corner of the box.
    pub fn upper(&self) -> &Point3<F> {
        &self.upper
    }

    /// Computes the vector from the lower to the upper corner.
    pub fn diagonal(&self) -> Vec3<F> {
        &self.upper - &self.lower
    }

    /// Computes the center of the box.
    pub fn center(&self) -> Point3<F> {
        let two = F::one() + F::one();
        Point3::with_each_component(|dim| (self.lower[dim] + self.upper[dim]) / two)
    }

    /// Computes the volume of the box.
    pub fn volume(&self) -> F {
        self.diagonal().product()
    }

    /// Whether the given point lies inside the closed box.
    ///
    /// Points with NaN components are never inside.
    pub fn contains(&self, point: &Point3<F>) -> bool {
        Dim3::slice()
            .iter()
            .all(|&dim| point[dim] >= self.lower[dim] && point[dim] <= self.upper[dim])
    }

    /// Returns a copy of the box grown by the given margin in every direction.
    pub fn extended(&self, margin: &Vec3<F>) -> Self {
        Self::new(&self.lower - margin, &self.upper + margin)
    }
}

impl<F: BFloat> fmt::Display for BoundingBox3<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} to {}", self.lower, self.upper)
    }
}

#[cfg(test)]
mod tests {

    use super::*;

    #[test]
    fn cross_product_is_orthogonal() {
        let a = Vec3::<f64>::new(1.0, 2.0, -0.5);
        let b = Vec3::new(-3.0, 0.25, 4.0);
        let c = a.cross(&b);
        assert!(c.dot(&a).abs() < 1e-12);
        assert!(c.dot(&b).abs() < 1e-12);
        assert_eq!(
            Vec3::new(1.0, 0.0, 0.0).cross(&Vec3::new(0.0, 1.0, 0.0)),
            Vec3::new(0.0, 0.0, 1.0)
        );
    }

    #[test]
    fn bounding_box_containment_is_closed() {
        let bounds = BoundingBox3::new(Point3::origin(), Point3::new(1.0, 2.0, 3.0));
        assert!(bounds.contains(&Point3::origin()));
        assert!(bounds.contains(&Point3::new(1.0, 2.0, 3.0)));
        assert!(!bounds.contains(&Point3::new(1.0 + 1e-12, 1.0, 1.0)));
        assert!(!bounds.contains(&Point3::new(f64::NAN, 1.0, 1.0)));
        assert_eq!(bounds.volume(), 6.0);
        assert_eq!(bounds.center(), Point3::new(0.5, 1.0, 1.5));
    }

    #[test]
    fn enclosing_box_covers_all_points() {
        let points = vec![
            Point3::new(0.5, -1.0, 2.0),
            Point3::new(-0.5, 3.0, 1.0),
            Point3::new(0.0, 0.0, 4.0),
        ];
        let bounds = BoundingBox3::enclosing(&points).unwrap();
        assert_eq!(bounds.lower(), &Point3::new(-0.5, -1.0, 1.0));
        assert_eq!(bounds.upper(), &Point3::new(0.5, 3.0, 4.0));
        assert!(BoundingBox3::<f64>::enclosing(&Vec::new()).is_none());
    }
}
