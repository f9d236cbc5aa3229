use chrono::Utc;
use rust_decimal::{Decimal, RoundingStrategy};
use uuid::Uuid;

use gilt_domain::pagination::PageRequest;

use crate::domain::repository::{ProductRepository, ReviewRepository};
use crate::domain::types::Review;
use crate::error::ApiError;

/// Derived rating aggregates: mean rounded to 1 decimal (0 when no
/// ratings remain) and the count. Full recompute, idempotent — called
/// after every review mutation, never updated incrementally.
pub fn aggregate_ratings(ratings: &[u8]) -> (Decimal, i32) {
    if ratings.is_empty() {
        return (Decimal::ZERO, 0);
    }
    let sum: u32 = ratings.iter().map(|r| u32::from(*r)).sum();
    let average = Decimal::from(sum) / Decimal::from(ratings.len() as u32);
    (
        average.round_dp_with_strategy(1, RoundingStrategy::MidpointAwayFromZero),
        ratings.len() as i32,
    )
}

fn validate_rating(rating: u8) -> Result<(), ApiError> {
    if !(1..=5).contains(&rating) {
        return Err(ApiError::validation("rating", "must be between 1 and 5"));
    }
    Ok(())
}

async fn recompute_product_rating<R: ReviewRepository, P: ProductRepository>(
    reviews: &R,
    products: &P,
    product_id: Uuid,
) -> Result<(), ApiError> {
    let ratings = reviews.ratings_for_product(product_id).await?;
    let (average, count) = aggregate_ratings(&ratings);
    products.set_rating(product_id, average, count).await
}

// ── ListProductReviews ───────────────────────────────────────────────────────

pub struct ListProductReviewsUseCase<R: ReviewRepository, P: ProductRepository> {
    pub reviews: R,
    pub products: P,
}

impl<R: ReviewRepository, P: ProductRepository> ListProductReviewsUseCase<R, P> {
    pub async fn execute(
        &self,
        product_id: Uuid,
        page: PageRequest,
    ) -> Result<Vec<Review>, ApiError> {
        if self.products.find_by_id(product_id).await?.is_none() {
            return Err(ApiError::ProductNotFound);
        }
        self.reviews.list_by_product(product_id, page).await
    }
}

// ── CreateReview ─────────────────────────────────────────────────────────────

pub struct CreateReviewInput {
    pub product_id: Uuid,
    pub rating: u8,
    pub comment: String,
}

pub struct CreateReviewUseCase<R: ReviewRepository, P: ProductRepository> {
    pub reviews: R,
    pub products: P,
}

impl<R: ReviewRepository, P: ProductRepository> CreateReviewUseCase<R, P> {
    /// One review per (user, product); a second submission is rejected,
    /// the update path is separate.
    pub async fn execute(&self, user_id: Uuid, input: CreateReviewInput) -> Result<Review, ApiError> {
        validate_rating(input.rating)?;
        if self.products.find_by_id(input.product_id).await?.is_none() {
            return Err(ApiError::ProductNotFound);
        }
        if self.reviews.find(user_id, input.product_id).await?.is_some() {
            return Err(ApiError::ReviewExists);
        }

        let now = Utc::now();
        let review = Review {
            id: Uuid::new_v4(),
            user_id,
            product_id: input.product_id,
            rating: input.rating,
            comment: input.comment,
            created_at: now,
            updated_at: now,
        };
        self.reviews.create(&review).await?;
        recompute_product_rating(&self.reviews, &self.products, input.product_id).await?;
        Ok(review)
    }
}

// ── UpdateReview ─────────────────────────────────────────────────────────────

pub struct UpdateReviewInput {
    pub product_id: Uuid,
    pub rating: u8,
    pub comment: String,
}

pub struct UpdateReviewUseCase<R: ReviewRepository, P: ProductRepository> {
    pub reviews: R,
    pub products: P,
}

impl<R: ReviewRepository, P: ProductRepository> UpdateReviewUseCase<R, P> {
    pub async fn execute(&self, user_id: Uuid, input: UpdateReviewInput) -> Result<Review, ApiError> {
        validate_rating(input.rating)?;
        let mut review = self
            .reviews
            .find(user_id, input.product_id)
            .await?
            .ok_or(ApiError::ReviewNotFound)?;

        review.rating = input.rating;
        review.comment = input.comment;
        review.updated_at = Utc::now();
        self.reviews.update(&review).await?;
        recompute_product_rating(&self.reviews, &self.products, input.product_id).await?;
        Ok(review)
    }
}

// ── DeleteReview ─────────────────────────────────────────────────────────────

pub struct DeleteReviewUseCase<R: ReviewRepository, P: ProductRepository> {
    pub reviews: R,
    pub products: P,
}

impl<R: ReviewRepository, P: ProductRepository> DeleteReviewUseCase<R, P> {
    pub async fn execute(&self, user_id: Uuid, product_id: Uuid) -> Result<(), ApiError> {
        let review = self
            .reviews
            .find(user_id, product_id)
            .await?
            .ok_or(ApiError::ReviewNotFound)?;
        let deleted = self.reviews.delete(review.id).await?;
        if !deleted {
            return Err(ApiError::ReviewNotFound);
        }
        recompute_product_rating(&self.reviews, &self.products, product_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::{MetalType, Product, ProductFilter};
    use std::sync::{Arc, Mutex};

    #[test]
    fn should_average_ratings_to_one_decimal() {
        let (avg, count) = aggregate_ratings(&[5, 4]);
        assert_eq!(avg, Decimal::new(45, 1)); // 4.5
        assert_eq!(count, 2);

        let (avg, count) = aggregate_ratings(&[5, 4, 4]);
        assert_eq!(avg, Decimal::new(43, 1)); // 4.333... -> 4.3
        assert_eq!(count, 3);
    }

    #[test]
    fn should_round_rating_midpoints_away_from_zero() {
        // 4.5 exactly, then (4+5+4+5)/4 = 4.5
        let (avg, _) = aggregate_ratings(&[4, 5, 4, 5]);
        assert_eq!(avg, Decimal::new(45, 1));
        // (1+2)/2 = 1.5
        let (avg, _) = aggregate_ratings(&[1, 2]);
        assert_eq!(avg, Decimal::new(15, 1));
    }

    #[test]
    fn should_zero_aggregates_when_no_ratings_remain() {
        let (avg, count) = aggregate_ratings(&[]);
        assert_eq!(avg, Decimal::ZERO);
        assert_eq!(count, 0);
    }

    struct MockReviewRepo {
        reviews: Arc<Mutex<Vec<Review>>>,
    }

    impl MockReviewRepo {
        fn new(reviews: Vec<Review>) -> Self {
            Self {
                reviews: Arc::new(Mutex::new(reviews)),
            }
        }

        fn handle(&self) -> Arc<Mutex<Vec<Review>>> {
            Arc::clone(&self.reviews)
        }
    }

    impl ReviewRepository for MockReviewRepo {
        async fn find(&self, user_id: Uuid, product_id: Uuid) -> Result<Option<Review>, ApiError> {
            Ok(self
                .reviews
                .lock()
                .unwrap()
                .iter()
                .find(|r| r.user_id == user_id && r.product_id == product_id)
                .cloned())
        }

        async fn list_by_product(
            &self,
            product_id: Uuid,
            _page: PageRequest,
        ) -> Result<Vec<Review>, ApiError> {
            Ok(self
                .reviews
                .lock()
                .unwrap()
                .iter()
                .filter(|r| r.product_id == product_id)
                .cloned()
                .collect())
        }

        async fn create(&self, review: &Review) -> Result<(), ApiError> {
            self.reviews.lock().unwrap().push(review.clone());
            Ok(())
        }

        async fn update(&self, review: &Review) -> Result<(), ApiError> {
            let mut reviews = self.reviews.lock().unwrap();
            if let Some(existing) = reviews.iter_mut().find(|r| r.id == review.id) {
                *existing = review.clone();
            }
            Ok(())
        }

        async fn delete(&self, id: Uuid) -> Result<bool, ApiError> {
            let mut reviews = self.reviews.lock().unwrap();
            let before = reviews.len();
            reviews.retain(|r| r.id != id);
            Ok(reviews.len() < before)
        }

        async fn ratings_for_product(&self, product_id: Uuid) -> Result<Vec<u8>, ApiError> {
            Ok(self
                .reviews
                .lock()
                .unwrap()
                .iter()
                .filter(|r| r.product_id == product_id)
                .map(|r| r.rating)
                .collect())
        }
    }

    struct MockProductRepo {
        product: Product,
        ratings_set: Arc<Mutex<Vec<(Uuid, Decimal, i32)>>>,
    }

    impl MockProductRepo {
        fn new(product: Product) -> Self {
            Self {
                product,
                ratings_set: Arc::new(Mutex::new(Vec::new())),
            }
        }

        fn ratings_handle(&self) -> Arc<Mutex<Vec<(Uuid, Decimal, i32)>>> {
            Arc::clone(&self.ratings_set)
        }
    }

    impl ProductRepository for MockProductRepo {
        async fn list(
            &self,
            _filter: &ProductFilter,
            _page: PageRequest,
        ) -> Result<Vec<Product>, ApiError> {
            Ok(vec![self.product.clone()])
        }

        async fn find_by_id(&self, id: Uuid) -> Result<Option<Product>, ApiError> {
            Ok((self.product.id == id).then(|| self.product.clone()))
        }

        async fn find_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Product>, ApiError> {
            Ok(ids
                .iter()
                .filter(|id| **id == self.product.id)
                .map(|_| self.product.clone())
                .collect())
        }

        async fn create(&self, _product: &Product) -> Result<(), ApiError> {
            Ok(())
        }

        async fn update(&self, _product: &Product) -> Result<(), ApiError> {
            Ok(())
        }

        async fn delete(&self, _id: Uuid) -> Result<bool, ApiError> {
            Ok(true)
        }

        async fn set_rating(&self, id: Uuid, average: Decimal, count: i32) -> Result<(), ApiError> {
            self.ratings_set.lock().unwrap().push((id, average, count));
            Ok(())
        }

        async fn append_images(&self, _id: Uuid, _urls: &[String]) -> Result<(), ApiError> {
            Ok(())
        }
    }

    fn product() -> Product {
        let now = Utc::now();
        Product {
            id: Uuid::new_v4(),
            name: "Gold Ring".into(),
            description: "18k band".into(),
            price: Decimal::from(2500),
            stock: 10,
            category_id: Uuid::new_v4(),
            metal_type: MetalType::Gold,
            images: vec!["https://img.example.com/ring.jpg".into()],
            ratings_average: Decimal::ZERO,
            ratings_count: 0,
            created_at: now,
            updated_at: now,
        }
    }

    fn review_for(product_id: Uuid, rating: u8) -> Review {
        let now = Utc::now();
        Review {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            product_id,
            rating,
            comment: "nice".into(),
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn should_create_review_and_recompute_aggregates() {
        let product = product();
        let products = MockProductRepo::new(product.clone());
        let ratings = products.ratings_handle();
        let uc = CreateReviewUseCase {
            reviews: MockReviewRepo::new(vec![review_for(product.id, 5)]),
            products,
        };

        uc.execute(
            Uuid::new_v4(),
            CreateReviewInput {
                product_id: product.id,
                rating: 4,
                comment: "lovely".into(),
            },
        )
        .await
        .unwrap();

        let ratings = ratings.lock().unwrap();
        assert_eq!(ratings[0], (product.id, Decimal::new(45, 1), 2));
    }

    #[tokio::test]
    async fn should_reject_duplicate_review_for_same_product() {
        let product = product();
        let user_id = Uuid::new_v4();
        let mut existing = review_for(product.id, 5);
        existing.user_id = user_id;
        let uc = CreateReviewUseCase {
            reviews: MockReviewRepo::new(vec![existing]),
            products: MockProductRepo::new(product.clone()),
        };

        let result = uc
            .execute(
                user_id,
                CreateReviewInput {
                    product_id: product.id,
                    rating: 3,
                    comment: "again".into(),
                },
            )
            .await;
        assert!(matches!(result, Err(ApiError::ReviewExists)));
    }

    #[tokio::test]
    async fn should_reject_out_of_range_rating() {
        let product = product();
        for rating in [0u8, 6] {
            let uc = CreateReviewUseCase {
                reviews: MockReviewRepo::new(vec![]),
                products: MockProductRepo::new(product.clone()),
            };
            let result = uc
                .execute(
                    Uuid::new_v4(),
                    CreateReviewInput {
                        product_id: product.id,
                        rating,
                        comment: String::new(),
                    },
                )
                .await;
            assert!(matches!(result, Err(ApiError::Validation { .. })));
        }
    }

    #[tokio::test]
    async fn should_recompute_to_remaining_mean_on_delete() {
        let product = product();
        let user_id = Uuid::new_v4();
        let mut mine = review_for(product.id, 1);
        mine.user_id = user_id;
        let reviews = MockReviewRepo::new(vec![mine, review_for(product.id, 4), review_for(product.id, 5)]);
        let products = MockProductRepo::new(product.clone());
        let ratings = products.ratings_handle();
        let uc = DeleteReviewUseCase { reviews, products };

        uc.execute(user_id, product.id).await.unwrap();

        let ratings = ratings.lock().unwrap();
        assert_eq!(ratings[0], (product.id, Decimal::new(45, 1), 2));
    }

    #[tokio::test]
    async fn should_zero_aggregates_when_last_review_deleted() {
        let product = product();
        let user_id = Uuid::new_v4();
        let mut mine = review_for(product.id, 4);
        mine.user_id = user_id;
        let reviews = MockReviewRepo::new(vec![mine]);
        let products = MockProductRepo::new(product.clone());
        let ratings = products.ratings_handle();
        let uc = DeleteReviewUseCase { reviews, products };

        uc.execute(user_id, product.id).await.unwrap();

        let ratings = ratings.lock().unwrap();
        assert_eq!(ratings[0], (product.id, Decimal::ZERO, 0));
    }

    #[tokio::test]
    async fn should_update_own_review_and_recompute() {
        let product = product();
        let user_id = Uuid::new_v4();
        let mut mine = review_for(product.id, 2);
        mine.user_id = user_id;
        let reviews = MockReviewRepo::new(vec![mine]);
        let review_handle = reviews.handle();
        let products = MockProductRepo::new(product.clone());
        let ratings = products.ratings_handle();
        let uc = UpdateReviewUseCase { reviews, products };

        let updated = uc
            .execute(
                user_id,
                UpdateReviewInput {
                    product_id: product.id,
                    rating: 5,
                    comment: "changed my mind".into(),
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.rating, 5);
        assert_eq!(review_handle.lock().unwrap()[0].rating, 5);
        assert_eq!(
            *ratings.lock().unwrap().first().unwrap(),
            (product.id, Decimal::from(5), 1)
        );
    }

    #[tokio::test]
    async fn should_reject_update_of_missing_review() {
        let product = product();
        let uc = UpdateReviewUseCase {
            reviews: MockReviewRepo::new(vec![]),
            products: MockProductRepo::new(product.clone()),
        };
        let result = uc
            .execute(
                Uuid::new_v4(),
                UpdateReviewInput {
                    product_id: product.id,
                    rating: 4,
                    comment: String::new(),
                },
            )
            .await;
        assert!(matches!(result, Err(ApiError::ReviewNotFound)));
    }
}
