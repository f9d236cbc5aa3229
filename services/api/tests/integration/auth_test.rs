use gilt_api::error::ApiError;
use gilt_api::usecase::auth::{
    ForgotPasswordUseCase, LoginInput, LoginUseCase, RegisterInput, RegisterUseCase,
    ResendOtpUseCase, ResetPasswordInput, ResetPasswordUseCase, VerifyOtpInput, VerifyOtpUseCase,
};
use gilt_api::domain::types::ResetProof;

use crate::helpers::StatefulUserRepo;

const TEST_SECRET: &str = "integration-auth-secret";
const EMAIL: &str = "jane@example.com";
const PASSWORD: &str = "password1";

fn shared(repo: &StatefulUserRepo) -> StatefulUserRepo {
    StatefulUserRepo::shared(repo.users_handle(), repo.outbox_handle())
}

async fn register(repo: &StatefulUserRepo) {
    let uc = RegisterUseCase {
        users: shared(repo),
    };
    uc.execute(RegisterInput {
        name: "Jane".into(),
        email: EMAIL.into(),
        password: PASSWORD.into(),
    })
    .await
    .unwrap();
}

fn stored_otp(repo: &StatefulUserRepo) -> String {
    repo.users_handle().lock().unwrap()[0]
        .otp_code
        .clone()
        .unwrap()
}

#[tokio::test]
async fn should_walk_register_verify_login_flow() {
    let repo = StatefulUserRepo::new(vec![]);
    register(&repo).await;

    {
        let users = repo.users_handle();
        let users = users.lock().unwrap();
        assert!(!users[0].is_verified);
        assert!(users[0].otp_code.is_some());
    }
    // The OTP email event was written alongside the user.
    assert_eq!(repo.outbox_handle().lock().unwrap().len(), 1);

    // Login before verification is rejected.
    let uc = LoginUseCase {
        users: shared(&repo),
        jwt_secret: TEST_SECRET.into(),
    };
    let result = uc
        .execute(LoginInput {
            email: EMAIL.into(),
            password: PASSWORD.into(),
        })
        .await;
    assert!(matches!(result, Err(ApiError::EmailNotVerified)));

    // A mismatched OTP leaves the state untouched.
    let uc = VerifyOtpUseCase {
        users: shared(&repo),
    };
    let result = uc
        .execute(VerifyOtpInput {
            email: EMAIL.into(),
            otp: "000000".into(),
        })
        .await;
    assert!(matches!(result, Err(ApiError::InvalidOtp)));
    assert!(!repo.users_handle().lock().unwrap()[0].is_verified);

    // The right OTP verifies exactly once.
    let otp = stored_otp(&repo);
    let uc = VerifyOtpUseCase {
        users: shared(&repo),
    };
    uc.execute(VerifyOtpInput {
        email: EMAIL.into(),
        otp: otp.clone(),
    })
    .await
    .unwrap();
    {
        let users = repo.users_handle();
        let users = users.lock().unwrap();
        assert!(users[0].is_verified);
        assert!(users[0].otp_code.is_none());
    }

    // Replaying the same OTP cannot verify a second time.
    let uc = VerifyOtpUseCase {
        users: shared(&repo),
    };
    let result = uc
        .execute(VerifyOtpInput {
            email: EMAIL.into(),
            otp,
        })
        .await;
    assert!(matches!(result, Err(ApiError::AlreadyVerified)));

    // Verified login issues tokens.
    let uc = LoginUseCase {
        users: shared(&repo),
        jwt_secret: TEST_SECRET.into(),
    };
    let out = uc
        .execute(LoginInput {
            email: EMAIL.into(),
            password: PASSWORD.into(),
        })
        .await
        .unwrap();
    assert!(!out.access_token.is_empty());
    assert!(!out.refresh_token.is_empty());
}

#[tokio::test]
async fn should_invalidate_old_otp_on_resend() {
    let repo = StatefulUserRepo::new(vec![]);
    register(&repo).await;
    let first_otp = stored_otp(&repo);

    let uc = ResendOtpUseCase {
        users: shared(&repo),
    };
    uc.execute(EMAIL).await.unwrap();

    let second_otp = stored_otp(&repo);
    // Still unverified; a fresh outbox event exists for the new code.
    assert!(!repo.users_handle().lock().unwrap()[0].is_verified);
    assert_eq!(repo.outbox_handle().lock().unwrap().len(), 2);

    if first_otp != second_otp {
        let uc = VerifyOtpUseCase {
            users: shared(&repo),
        };
        let result = uc
            .execute(VerifyOtpInput {
                email: EMAIL.into(),
                otp: first_otp,
            })
            .await;
        assert!(matches!(result, Err(ApiError::InvalidOtp)));
    }

    let uc = VerifyOtpUseCase {
        users: shared(&repo),
    };
    uc.execute(VerifyOtpInput {
        email: EMAIL.into(),
        otp: second_otp,
    })
    .await
    .unwrap();
}

#[tokio::test]
async fn should_reset_password_with_independent_otp_pair() {
    let repo = StatefulUserRepo::new(vec![]);
    register(&repo).await;

    // Verify first so login works at the end.
    let otp = stored_otp(&repo);
    let uc = VerifyOtpUseCase {
        users: shared(&repo),
    };
    uc.execute(VerifyOtpInput {
        email: EMAIL.into(),
        otp,
    })
    .await
    .unwrap();

    let uc = ForgotPasswordUseCase {
        users: shared(&repo),
    };
    uc.execute(EMAIL).await.unwrap();

    let reset_otp = {
        let users = repo.users_handle();
        let users = users.lock().unwrap();
        // Reset pair is scoped separately from the registration OTP.
        assert!(users[0].otp_code.is_none());
        assert!(users[0].reset_token.is_some());
        users[0].reset_otp.clone().unwrap()
    };

    let uc = ResetPasswordUseCase {
        users: shared(&repo),
    };
    uc.execute(ResetPasswordInput {
        email: EMAIL.into(),
        proof: ResetProof {
            otp: Some(reset_otp),
            token: None,
        },
        new_password: "brand-new-pass".into(),
    })
    .await
    .unwrap();

    // Old password dead, new password works.
    let uc = LoginUseCase {
        users: shared(&repo),
        jwt_secret: TEST_SECRET.into(),
    };
    let result = uc
        .execute(LoginInput {
            email: EMAIL.into(),
            password: PASSWORD.into(),
        })
        .await;
    assert!(matches!(result, Err(ApiError::InvalidCredentials)));

    let uc = LoginUseCase {
        users: shared(&repo),
        jwt_secret: TEST_SECRET.into(),
    };
    uc.execute(LoginInput {
        email: EMAIL.into(),
        password: "brand-new-pass".into(),
    })
    .await
    .unwrap();
}
