use std::path::Path;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;

/// Creates and seeds a company database at `path`, then hands back a
/// read-only pool opened the same way the worker opens it.
pub async fn seed_db(path: &Path) -> SqlitePool {
    let opts = SqliteConnectOptions::new()
        .filename(path)
        .create_if_missing(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(opts)
        .await
        .expect("failed to create test database");

    for ddl in [
        r#"
        CREATE TABLE funcionarios (
            id                  INTEGER PRIMARY KEY,
            nome                TEXT NOT NULL,
            email               TEXT NOT NULL UNIQUE,
            divisao             TEXT NOT NULL,
            departamento        TEXT NOT NULL,
            cargo               TEXT NOT NULL,
            salario_base_mensal REAL NOT NULL,
            data_contratacao    TEXT NOT NULL,
            status              TEXT NOT NULL CHECK (status IN ('Ativo', 'Inativo'))
        )
        "#,
        r#"
        CREATE TABLE pagamentos (
            id             INTEGER PRIMARY KEY,
            id_funcionario INTEGER NOT NULL REFERENCES funcionarios (id),
            mes_referencia TEXT    NOT NULL,
            valor_pago     REAL    NOT NULL,
            data_pagamento TEXT    NOT NULL,
            status         TEXT    NOT NULL CHECK (status IN ('Pago', 'Pendente'))
        )
        "#,
        r#"
        CREATE TABLE gastos_internos (
            id               INTEGER PRIMARY KEY,
            id_funcionario   INTEGER NOT NULL REFERENCES funcionarios (id),
            descricao        TEXT    NOT NULL,
            valor            REAL    NOT NULL,
            data_gasto       TEXT    NOT NULL,
            status_aprovacao TEXT    NOT NULL
                CHECK (status_aprovacao IN ('Aprovado', 'Pendente', 'Rejeitado'))
        )
        "#,
    ] {
        sqlx::query(ddl).execute(&pool).await.expect("ddl failed");
    }

    sqlx::query(
        r#"
        INSERT INTO funcionarios
            (id, nome, email, divisao, departamento, cargo,
             salario_base_mensal, data_contratacao, status)
        VALUES
            (1, 'Bruna Martins', 'bruna@empresa.com', 'Tecnologia e Produto',
             'Engenharia de Software', 'Engenheiro de Software Sr', 9000.0, '2021-03-01', 'Ativo'),
            (2, 'Carlos Lima', 'carlos@empresa.com', 'Tecnologia e Produto',
             'Engenharia de Software', 'Engenheiro de Software Jr', 4500.0, '2023-05-10', 'Ativo'),
            (3, 'Davi Souza', 'davi@empresa.com', 'Tecnologia e Produto',
             'Engenharia de Software', 'Arquiteto de Solucoes', 12000.0, '2019-01-15', 'Inativo'),
            (4, 'Ana', 'ana@x.com', 'Tecnologia e Produto',
             'TI', 'Analista de Suporte N1', 3000.0, '2022-07-01', 'Ativo')
        "#,
    )
    .execute(&pool)
    .await
    .expect("failed to insert funcionarios");

    sqlx::query(
        r#"
        INSERT INTO gastos_internos
            (id, id_funcionario, descricao, valor, data_gasto, status_aprovacao)
        VALUES
            (1, 1, 'Licenca Software', 1200.5, '2024-02-10', 'Aprovado'),
            (2, 2, 'Curso de Rust', 300.0, '2024-02-11', 'Aprovado'),
            (3, 2, 'Cafe', 50.0, '2024-02-12', 'Rejeitado'),
            (4, 3, 'Equipamento (Hardware)', 900.0, '2024-02-13', 'Aprovado')
        "#,
    )
    .execute(&pool)
    .await
    .expect("failed to insert gastos_internos");

    sqlx::query(
        r#"
        INSERT INTO pagamentos
            (id, id_funcionario, mes_referencia, valor_pago, data_pagamento, status)
        VALUES
            (1, 4, '2024-01', 1500.0, '2024-02-01', 'Pendente'),
            (2, 1, '2023-12', 9000.0, '2024-01-05', 'Pago')
        "#,
    )
    .execute(&pool)
    .await
    .expect("failed to insert pagamentos");

    pool.close().await;

    relatoria::db::open_read_only(path)
        .await
        .expect("failed to reopen test database read-only")
}
